use indoor_nav::api::{JsonFormatter, NavigationEngine, NavigationResponse, RequestFile, TextFormatter};
use indoor_nav::utils::{init_logging, ConfigurationManager, EngineConfig};
use tracing::{info, warn};

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    request_path: String,
    config_path: Option<String>,
    pretty: bool,
    text: bool,
    verbose: bool,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <request.json> [--config <file>] [--pretty] [--text] [--verbose]",
        program
    )
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let program = args.first().map_or("indoor-nav", |s| s.as_str());
    let mut cli = CliArgs::default();
    let mut request_path = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => match iter.next() {
                Some(path) => cli.config_path = Some(path.clone()),
                None => return Err(format!("--config needs a file\n{}", usage(program))),
            },
            "--pretty" => cli.pretty = true,
            "--text" => cli.text = true,
            "--verbose" | "-v" => cli.verbose = true,
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown option {}\n{}", flag, usage(program)));
            }
            path if request_path.is_none() => request_path = Some(path.to_string()),
            extra => return Err(format!("Unexpected argument {}\n{}", extra, usage(program))),
        }
    }

    cli.request_path = request_path.ok_or_else(|| usage(program))?;
    Ok(cli)
}

fn handle_request(json_data: &str, config: EngineConfig) -> Result<NavigationResponse, Box<dyn std::error::Error>> {
    let request_file: RequestFile = serde_json::from_str(json_data)?;
    let (registry, request) = request_file.into_parts();
    info!(
        anchors = registry.anchor_count(),
        samples = request.samples.len(),
        destination = ?request.destination,
        "Handling navigation request"
    );

    let engine = NavigationEngine::new(config);
    let response = engine.navigate(&request, &registry, &registry)?;

    for rejected in &response.rejected {
        warn!(anchor = %rejected.sample.anchor_id, rssi = rejected.sample.rssi, "Sample rejected: {}", rejected.reason);
    }
    Ok(response)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args)?;
    init_logging(cli.verbose);

    let config = match &cli.config_path {
        Some(path) => ConfigurationManager::from_file(path)?.config().clone(),
        None => EngineConfig::default(),
    };
    let axis_threshold_m = config.axis_threshold_m;

    let json_data = std::fs::read_to_string(&cli.request_path)?;
    let response = handle_request(&json_data, config)?;

    if cli.text {
        let formatter = TextFormatter {
            include_rejected: cli.verbose,
            axis_threshold_m,
            ..TextFormatter::default()
        };
        print!("{}", formatter.format_text(&response));
    } else {
        let formatter = if cli.pretty { JsonFormatter::pretty() } else { JsonFormatter::new() };
        println!("{}", formatter.format_json(&response)?);
    }

    Ok(())
}
