use tracing::info;

use reaper_runner::{Reaper, format_report};

use super::RunArgs;

pub async fn run(args: &RunArgs) -> anyhow::Result<()> {
    let config = args.provider.load()?;
    let policy = args.policy(&config)?;
    let probe = args.provider.probe_target(&config)?;
    let provider = args.provider.inventory_provider(&config)?;

    info!(
        region = provider.region(),
        probe = %probe.url_for("<instance>"),
        "provider ready"
    );

    let reaper = Reaper::new(provider);
    let report = reaper.run(&policy, &probe).await;

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            print!("{}", format_report(&report));
        }
    }

    Ok(())
}
