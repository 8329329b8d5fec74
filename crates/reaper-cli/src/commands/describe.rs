use reaper_core::parse_group_list;
use reaper_provider::CloudProvider;

use super::DescribeArgs;

pub async fn describe(args: &DescribeArgs) -> anyhow::Result<()> {
    let config = args.provider.load()?;
    let probe = args.provider.probe_target(&config)?;
    let provider = args.provider.inventory_provider(&config)?;

    if let Some(id) = &args.instance {
        let detail = provider.get_instance_version_detail(id, &probe).await?;
        match args.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&detail)?),
            _ => println!(
                "{}  version {}  launched {}",
                detail.id, detail.version, detail.launch_time
            ),
        }
        return Ok(());
    }

    let names = args
        .groups
        .as_deref()
        .map(parse_group_list)
        .unwrap_or_default();
    let groups = provider.describe_auto_scaling_groups(&names, &probe).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    for group in &groups {
        println!("{} ({} instances)", group.name, group.instances.len());
        for instance in &group.instances {
            let version = group
                .version_details
                .iter()
                .find(|d| d.id == instance.id)
                .map(|d| d.version.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "  {:<20} {:<10} {:<14} {}",
                instance.id, instance.health_status, instance.lifecycle_state, version
            );
        }
    }

    Ok(())
}
