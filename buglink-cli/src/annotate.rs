//! The `annotate` command: rewrite one changelog entry

use std::io::Read;
use std::path::PathBuf;

use buglink::{Annotator, FallbackPolicy, Session, TrackerConfig, YamlConfig};

use crate::cli::FallbackMode;
use crate::error::{CliError, CliResult};

pub struct AnnotateArgs {
    pub text: Option<String>,
    pub base_url: Option<String>,
    pub pattern: Option<String>,
    pub tooltips: bool,
    pub fallback: Option<FallbackMode>,
}

/// Resolve the effective configuration: defaults, then environment,
/// then the YAML file, then command-line overrides.
fn load_config(config_path: Option<&PathBuf>, args: &AnnotateArgs) -> CliResult<TrackerConfig> {
    let mut config = TrackerConfig::from_env();

    if let Some(path) = config_path {
        let yaml = YamlConfig::load_from_file(path).map_err(CliError::validation)?;
        yaml.apply_to_config(&mut config);
    }

    if let Some(ref base_url) = args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(ref pattern) = args.pattern {
        config.id_pattern = pattern.clone();
    }
    if args.tooltips {
        config.use_tooltips = true;
    }
    if let Some(mode) = args.fallback {
        config.fallback = FallbackPolicy::from(mode);
    }

    config.validate().map_err(CliError::validation)?;
    Ok(config)
}

pub async fn run_annotate_command(
    args: AnnotateArgs,
    config_path: Option<&PathBuf>,
) -> CliResult<()> {
    let config = load_config(config_path, &args)?;

    let text = match args.text {
        Some(ref text) => text.clone(),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::general)?;
            buffer
        }
    };

    let session = if config.use_tooltips {
        Some(Session::new(&config).map_err(CliError::validation)?)
    } else {
        None
    };

    let annotator = Annotator::new(&config, session.as_ref());
    println!("{}", annotator.annotate(&text).await);
    Ok(())
}
