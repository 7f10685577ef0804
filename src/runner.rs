use crate::cli::Cli;
use waf_origin_check::config::{Credentials, Options};
use waf_origin_check::error::error_chain;
use waf_origin_check::output::{header_lines, OriginReport};
use waf_origin_check::probe::ReachabilityChecker;
use waf_origin_check::sites::SiteLister;

fn init_logging(options: &Options) {
    // Our crate at the requested level, HTTP internals capped at info.
    // RUST_LOG wins when set. Logs go to stderr so stdout stays the report.
    use tracing_subscriber::EnvFilter;
    let crate_level = if options.debug { "debug" } else if options.verbose { "info" } else { "warn" };
    let filter_str = format!(
        "waf_origin_check={crate},reqwest=info,hyper=info,rustls=warn",
        crate = crate_level
    );
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&filter_str))
        .unwrap_or_else(|_| EnvFilter::new(crate_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    let options = cli.into_options();
    init_logging(&options);

    let credentials = Credentials::load(&options.env_path)?;
    tracing::info!(env=%options.env_path.display(), "credentials loaded");

    for line in header_lines(&credentials, &options) {
        println!("{}", line);
    }

    let lister = SiteLister::new(&credentials)?;
    let sites = lister.list_sites().await?;

    let results = if options.list_only {
        tracing::info!("list-only mode, skipping origin checks");
        None
    } else {
        println!("[*] Checking {} origins directly (timeout {}s)...", sites.len(), options.timeout_secs);
        let checker = ReachabilityChecker::from_options(&options);
        Some(checker.check_all(&sites).await)
    };

    let report = OriginReport::new(&sites, results.as_deref());
    report.print_summary();

    if let Some(path) = &options.output_path {
        match report.save_to_file(path) {
            Ok(()) => println!("[+] Report written to {}", path.display()),
            Err(e) => {
                tracing::error!(error=%e, "failed to write report file");
                eprintln!("[!] Could not write report: {}", error_chain(&e));
            }
        }
    }

    Ok(())
}
