//! REPL command parsing and dispatch into the runner.

use clap::{Parser, Subcommand};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use warden_core::{Control, EngineStatus, EntityRef, GameId, GuideEvent, Location, MobClass, RunnerInput};

use crate::mobs::MobTable;

pub type Input = RunnerInput<MobTable>;

#[derive(Parser, Debug)]
#[command(version, about = "warden", no_binary_name = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Enter a zone (drops pending timers, loads its guide)
    Zone { id: u32 },
    /// Register or move a mob
    Mob {
        #[arg(short, long)]
        id: u64,
        #[arg(short, long)]
        zone: u32,
        #[arg(short, long)]
        template: u32,
        #[arg(long, default_value_t = 0.0)]
        x: f32,
        #[arg(long, default_value_t = 0.0)]
        y: f32,
        #[arg(long, default_value_t = 0.0)]
        z: f32,
        /// Heading in radians
        #[arg(long, default_value_t = 0.0)]
        w: f32,
    },
    /// Remove a mob
    Forget { id: u64 },
    /// A mob casts a skill
    Skill {
        #[arg(short, long)]
        source: u64,
        #[arg(short, long)]
        id: u64,
        #[arg(long, default_value_t = 1.0)]
        speed: f32,
    },
    /// An abnormality begins (or refreshes) on a target
    Abnormal {
        #[arg(short, long)]
        target: u64,
        #[arg(short, long)]
        source: Option<u64>,
        #[arg(short, long)]
        id: u32,
        #[arg(long)]
        refresh: bool,
    },
    /// Boss health gauge update
    Gauge {
        #[arg(short, long)]
        id: u64,
        #[arg(long)]
        cur: u64,
        #[arg(long)]
        max: u64,
    },
    /// Enable or disable the guide module
    Toggle,
    /// Flip a debug flag (debug, skill, boss, abnormal, hp)
    Debug { flag: String },
    /// Reload the current zone's guide from disk
    Reload,
    Status,
    Exit,
}

/// Parse a REPL line into a command.
pub fn parse(line: &str) -> Result<Option<Commands>, String> {
    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(cli.command)
}

/// Translate a command into runner input, in send order. `Status` and `Exit`
/// are handled by the caller and produce nothing.
pub fn to_inputs(command: Commands) -> Vec<Input> {
    let input = match command {
        // Mobs from the previous zone are gone once the new one loads
        Commands::Zone { id } => {
            return vec![
                RunnerInput::UpdateWorld(Box::new(|mobs: &mut MobTable| mobs.clear())),
                RunnerInput::Event(GuideEvent::ZoneLoaded { zone: id }),
            ];
        }
        Commands::Mob {
            id,
            zone,
            template,
            x,
            y,
            z,
            w,
        } => {
            let entity = EntityRef::new(MobClass::new(zone, template), Location::new(x, y, z, w));
            RunnerInput::UpdateWorld(Box::new(move |mobs: &mut MobTable| {
                mobs.insert(GameId(id), entity);
            }))
        }
        Commands::Forget { id } => RunnerInput::UpdateWorld(Box::new(move |mobs: &mut MobTable| {
            mobs.remove(GameId(id));
        })),
        Commands::Skill { source, id, speed } => RunnerInput::Event(GuideEvent::SkillCast {
            source: GameId(source),
            skill: id,
            speed,
        }),
        Commands::Abnormal {
            target,
            source,
            id,
            refresh,
        } => {
            let target = GameId(target);
            let source = source.map(GameId);
            RunnerInput::Event(if refresh {
                GuideEvent::AbnormalityRefresh {
                    target,
                    source,
                    abnormality_id: id,
                }
            } else {
                GuideEvent::AbnormalityBegin {
                    target,
                    source,
                    abnormality_id: id,
                }
            })
        }
        Commands::Gauge { id, cur, max } => RunnerInput::Event(GuideEvent::BossGauge {
            id: GameId(id),
            cur_hp: cur,
            max_hp: max,
        }),
        Commands::Toggle => RunnerInput::Control(Control::Toggle),
        Commands::Debug { flag } => RunnerInput::Control(Control::ToggleDebug(flag)),
        Commands::Reload => RunnerInput::Control(Control::Reload),
        Commands::Status | Commands::Exit => return Vec::new(),
    };
    vec![input]
}

/// Handle one REPL line. Returns `Ok(true)` when the user asked to quit.
pub async fn respond(line: &str, tx: &UnboundedSender<Input>) -> Result<bool, String> {
    let Some(command) = parse(line)? else {
        return Ok(false);
    };

    match command {
        Commands::Exit => {
            println!("Exiting...");
            Ok(true)
        }
        Commands::Status => {
            let (reply_tx, reply_rx) = oneshot::channel();
            send(tx, RunnerInput::Control(Control::Status(reply_tx)))?;
            let status = reply_rx.await.map_err(|e| e.to_string())?;
            print_status(&status);
            Ok(false)
        }
        command => {
            for input in to_inputs(command) {
                send(tx, input)?;
            }
            Ok(false)
        }
    }
}

fn send(tx: &UnboundedSender<Input>, input: Input) -> Result<(), String> {
    tx.send(input).map_err(|_| "engine has stopped".to_string())
}

fn print_status(status: &EngineStatus) {
    let on = |flag: bool| if flag { "on" } else { "off" };
    println!("Guide module:   {}", on(status.enabled));
    match status.zone {
        Some(zone) if status.guide_found => {
            println!("Zone:           {zone} ({} entries)", status.guide_entries)
        }
        Some(zone) => println!("Zone:           {zone} (no guide)"),
        None => println!("Zone:           none"),
    }
    println!("Pending timers: {}", status.pending_timers);
    println!("Speech:         {}", on(status.speech_available));
    println!(
        "Debug:          debug={} skill={} boss={} abnormal={} hp={}",
        on(status.debug.debug),
        on(status.debug.skill),
        on(status.debug.boss),
        on(status.debug.abnormal),
        on(status.debug.hp),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skill_defaults_speed() {
        let command = parse("skill --source 42 --id 1104").unwrap();
        assert_eq!(
            command,
            Some(Commands::Skill {
                source: 42,
                id: 1104,
                speed: 1.0
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_quoting_and_unknown_commands() {
        assert!(parse("debug \"skill").is_err());
        assert!(parse("explode").is_err());
    }

    #[test]
    fn test_abnormal_refresh_maps_to_refresh_event() {
        let command = parse("abnormal -t 1 -i 10 --refresh").unwrap().unwrap();
        let Some(RunnerInput::Event(event)) = to_inputs(command).pop() else {
            panic!("expected an event");
        };
        assert_eq!(
            event,
            GuideEvent::AbnormalityRefresh {
                target: GameId(1),
                source: None,
                abnormality_id: 10,
            }
        );
    }

    #[test]
    fn test_mob_command_updates_table() {
        let command = parse("mob --id 42 --zone 3026 --template 1000 --x 5 --w 1.5")
            .unwrap()
            .unwrap();
        let Some(RunnerInput::UpdateWorld(update)) = to_inputs(command).pop() else {
            panic!("expected a world update");
        };
        let mut mobs = MobTable::default();
        update(&mut mobs);

        use warden_core::EntityLookup;
        let mob = mobs.find_mob(GameId(42)).unwrap();
        assert_eq!(mob.class, MobClass::new(3026, 1000));
        assert_eq!(mob.location, Location::new(5.0, 0.0, 0.0, 1.5));
    }

    #[test]
    fn test_status_and_exit_stay_local() {
        assert!(to_inputs(Commands::Status).is_empty());
        assert!(to_inputs(Commands::Exit).is_empty());
    }

    #[test]
    fn test_zone_forgets_mobs_before_loading() {
        let mut mobs = MobTable::default();
        mobs.insert(
            GameId(42),
            EntityRef::new(MobClass::new(3026, 1000), Location::default()),
        );

        let command = parse("zone 3027").unwrap().unwrap();
        let mut inputs = to_inputs(command).into_iter();

        let Some(RunnerInput::UpdateWorld(update)) = inputs.next() else {
            panic!("expected the mob table to be cleared first");
        };
        update(&mut mobs);
        assert!(mobs.is_empty());

        assert!(matches!(
            inputs.next(),
            Some(RunnerInput::Event(GuideEvent::ZoneLoaded { zone: 3027 }))
        ));
        assert!(inputs.next().is_none());
    }
}
