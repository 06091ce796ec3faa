#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::time::Duration;

use toro_life::config::SimConfig;
use toro_life::render::AsciiRenderer;
use toro_life::runtime;

struct MainArgs {
    config: SimConfig,
    headless: bool,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SimConfig::default();
    let mut headless = false;
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--size" => {
                i += 1;
                let n: usize = next_arg(i, "--size")
                    .parse()
                    .expect("--size requires a positive integer");
                config = config.grid_size(n);
            }
            "--workers" => {
                i += 1;
                let n: usize = next_arg(i, "--workers")
                    .parse()
                    .expect("--workers requires a positive integer");
                config = config.workers(n);
            }
            "--steps" => {
                i += 1;
                let n: u64 = next_arg(i, "--steps")
                    .parse()
                    .expect("--steps requires a non-negative integer");
                config = config.steps(n);
                headless = true;
            }
            "--seed" => {
                i += 1;
                let n: u64 = next_arg(i, "--seed")
                    .parse()
                    .expect("--seed requires an integer");
                config = config.seed(n);
            }
            "--density" => {
                i += 1;
                let d: f64 = next_arg(i, "--density")
                    .parse()
                    .expect("--density requires a number in [0, 1]");
                config = config.density(d);
            }
            "--interval-ms" => {
                i += 1;
                let ms: u64 = next_arg(i, "--interval-ms")
                    .parse()
                    .expect("--interval-ms requires a non-negative integer");
                config = config.frame_interval(Duration::from_millis(ms));
            }
            "--headless" => {
                headless = true;
            }
            other => panic!(
                "unknown argument: {other}\nusage: toro-life [--size N] [--workers N] [--seed N] [--density F] [--interval-ms N] [--steps N] [--headless]"
            ),
        }
        i += 1;
    }
    MainArgs { config, headless }
}

fn main() {
    env_logger::init();
    let args = parse_args();

    let outcome = if args.headless {
        runtime::run_headless(&args.config).map(|snapshot| {
            println!(
                "final population after {} generations: {}",
                snapshot.generation,
                snapshot.population()
            );
        })
    } else {
        let mut renderer = AsciiRenderer::stdout();
        runtime::run_animated(&args.config, &mut renderer)
    };

    if let Err(err) = outcome {
        eprintln!("toro-life: {err}");
        std::process::exit(1);
    }
}
