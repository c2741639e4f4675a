extern crate env_logger;
extern crate tabswarm;

pub mod options;

use clap::Parser;
use options::{Cli, Commands};
use tabswarm::automation::{self, Automation};
use tabswarm::behavior;
use tabswarm::configuration::{Browser, Configuration, WorkerMode};
use tabswarm::participants;
use tabswarm::session::UserMemory;
use tabswarm::string_concat::string_concat;
use tabswarm::string_concat::string_concat_impl;
use tabswarm::tokio;
use tabswarm::utils::log;
use tabswarm::worker::Swarm;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        use env_logger::Env;
        let env = Env::default()
            .filter_or("RUST_LOG", "info")
            .write_style_or("RUST_LOG_STYLE", "always");

        env_logger::init_from_env(env);
    }

    match cli.command {
        Commands::RUN {
            server_url,
            database,
            tournament,
            threads,
            workers,
            steps,
            webdriver_url,
            browser,
            headed,
            agent,
        } => {
            run_fleet(
                server_url,
                database,
                tournament,
                threads,
                workers,
                steps,
                webdriver_url,
                browser,
                headed,
                agent,
            )
            .await
        }
        Commands::SOLO {
            register_url,
            steps,
            webdriver_url,
            browser,
            headed,
        } => run_solo(register_url, steps, webdriver_url, browser, headed).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_fleet(
    server_url: String,
    database: String,
    tournament: String,
    threads: bool,
    workers: usize,
    steps: usize,
    webdriver_url: String,
    browser: Browser,
    headed: bool,
    agent: Option<String>,
) {
    let participants = match participants::load_participants(&database).await {
        Ok(participants) => participants,
        Err(e) => {
            eprintln!("could not read participants from {database}: {e}");
            std::process::exit(1);
        }
    };
    if participants.is_empty() {
        eprintln!("no participants found in {database}");
        std::process::exit(1);
    }

    let mut configuration = Configuration::new(&server_url)
        .with_webdriver_url(&webdriver_url)
        .with_browser(browser)
        .with_headless(!headed)
        .with_workers(workers)
        .with_steps_per_visit(steps)
        .with_worker_mode(if threads {
            WorkerMode::Threads
        } else {
            WorkerMode::Tasks
        });
    if let Some(agent) = agent {
        configuration = configuration.with_user_agent(agent);
    }

    let mut swarm = Swarm::new(configuration);
    let seeded = swarm.seed(participants);
    log(
        "seeded sessions for tournament",
        string_concat!(seeded.to_string(), " / ", tournament),
    );

    swarm.launch();

    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("could not listen for the shutdown signal: {e}");
    }
    log("stopping swarm", &tournament);
    swarm.stop();
    swarm.wait().await;
}

async fn run_solo(
    register_url: String,
    steps: usize,
    webdriver_url: String,
    browser: Browser,
    headed: bool,
) {
    let configuration = Configuration::new(&register_url)
        .with_webdriver_url(&webdriver_url)
        .with_browser(browser)
        .with_headless(!headed);

    let handle = match automation::launch_handle(&configuration).await {
        Some(handle) => handle,
        None => {
            eprintln!("could not open a WebDriver session at {webdriver_url}");
            std::process::exit(1);
        }
    };

    let mut memory = UserMemory::new(register_url);
    for _ in 0..steps {
        if let Err(e) = behavior::run_step(&mut memory, &handle, &configuration).await {
            log("step failed", e.to_string());
        }
    }

    if let Err(e) = handle.quit().await {
        eprintln!("could not release the WebDriver session: {e}");
    }
}
