use sim_lib::config::SimConfig;
use sim_lib::logger::TraceLogger;
use sim_lib::run_wrapper;
use std::env;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let program_file =
        args.next().ok_or("You should specify exactly one program file")?;

    let mut config = SimConfig::default();
    let mut log_base: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" => config.verbose = true,
            "-c" => {
                let limit = args
                    .next()
                    .ok_or("You should specify a cycle limit after -c")?;
                config.max_cycles = Some(limit.parse()?);
            }
            "-r" => {
                let pair = args
                    .next()
                    .ok_or("You should specify NAME=VALUE after -r")?;
                let (name, value) = pair
                    .split_once('=')
                    .ok_or("Expected NAME=VALUE after -r")?;
                config.initial_values.push((name.to_string(), value.parse()?));
            }
            "-l" => {
                let base = args
                    .next()
                    .ok_or("You should specify a log file base after -l")?;
                log_base = Some(PathBuf::from(base));
            }
            _ => return Err(format!("Unknown parameter: {}", arg).into()),
        }
    }

    let program = run_wrapper::load_program(&program_file)?;

    let mut logger = match &log_base {
        Some(base) => Some(TraceLogger::create(base)?),
        None => None,
    };

    let scheduler =
        run_wrapper::run_program(&config, program, |snapshot| match &mut logger {
            Some(logger) => logger.record(snapshot),
            None => Ok(()),
        })?;

    if let Some(logger) = logger {
        logger.finish()?;
    }

    let history = scheduler.history;
    eprintln!(
        "[HISTORY] cycles = {}, instructions = {}, commits = {}, branches = {}",
        history.cycles, history.issued, history.commits, history.branches_resolved
    );

    // Final state: every register that ended up non-zero
    for reg in scheduler.registers().iter() {
        if reg.value() != 0 {
            println!("{} = {}", reg.name(), reg.value());
        }
    }

    Ok(())
}
