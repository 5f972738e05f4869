//! The `check` command: validate tracker settings one at a time

use serde::Serialize;

use crate::cli::{CheckFormat, CheckSubcommand};
use crate::exit_codes::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Debug, Serialize)]
struct CheckOutcome {
    check: &'static str,
    ok: bool,
    message: String,
}

pub async fn run_check_command(subcommand: CheckSubcommand, format: CheckFormat) -> i32 {
    let outcome = match subcommand {
        CheckSubcommand::Pattern { value } => match buglink::check::pattern(&value) {
            Ok(()) => CheckOutcome {
                check: "pattern",
                ok: true,
                message: format!("pattern '{value}' is usable"),
            },
            Err(e) => CheckOutcome {
                check: "pattern",
                ok: false,
                message: e.to_string(),
            },
        },
        CheckSubcommand::Url { value } => match buglink::check::endpoint(&value).await {
            Ok(version) => CheckOutcome {
                check: "url",
                ok: true,
                message: format!("tracker at '{value}' reports version {version}"),
            },
            Err(e) => CheckOutcome {
                check: "url",
                ok: false,
                message: e.to_string(),
            },
        },
        CheckSubcommand::Login {
            url,
            username,
            password,
        } => match buglink::check::credentials(&url, &username, &password).await {
            Ok(()) => CheckOutcome {
                check: "login",
                ok: true,
                message: format!("'{username}' authenticates against '{url}'"),
            },
            Err(e) => CheckOutcome {
                check: "login",
                ok: false,
                message: e.to_string(),
            },
        },
    };

    match format {
        CheckFormat::Text => {
            if outcome.ok {
                println!("ok: {}", outcome.message);
            } else {
                eprintln!("error: {}", outcome.message);
            }
        }
        CheckFormat::Json => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!("cannot serialize check outcome: {e}");
                return EXIT_ERROR;
            }
        },
    }

    if outcome.ok {
        EXIT_SUCCESS
    } else {
        EXIT_ERROR
    }
}
