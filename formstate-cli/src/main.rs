use std::fs::File;
use std::time::Duration;

use email_address::EmailAddress;
use formstate_lib::prelude::*;
use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::task::JoinHandle;

const TAKEN_USERNAMES: &[&str] = &["admin", "root"];

fn signup_config() -> FormConfig {
    FormConfig::default()
        .with_validate_on([Trigger::Change, Trigger::Submit])
        .with_default_value("country", "NL")
        .with_validator(
            "email",
            validator_fn(|value: String, rule: Rule| async move {
                Ok((!EmailAddress::is_valid(&value)).then(|| rule.message()))
            }),
        )
        .with_sanitizer("trim", |value: &str| value.trim().to_string())
}

fn username_rules() -> Rules {
    Rules::new()
        .required("Username is required")
        .min_length(3, "Username must be at least 3 characters")
        .with(Rule::validate(|value: String| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            TAKEN_USERNAMES
                .contains(&value.as_str())
                .then(|| format!("'{}' is already taken", value))
        }))
}

fn build_form() -> Result<FormEngine, FormError> {
    let engine = FormEngine::new(signup_config());
    engine.register("username", Some(username_rules()), Some("trim"))?;
    engine.register(
        "email",
        Some(
            Rules::new()
                .required("Email is required")
                .with(Rule::custom("email").with_message("Enter a valid email address")),
        ),
        Some("trim"),
    )?;
    engine.register(
        "zip",
        Some(Rules::new().required("Zip is required").min_length(4, "Zip must have 4 digits")),
        Some("numbers"),
    )?;
    engine.register("country", None, None)?;
    Ok(engine)
}

async fn apply_edits(engine: &FormEngine, edits: &[(&str, &str)]) {
    let pending: Vec<_> = edits
        .iter()
        .filter_map(|(field, value)| engine.handle_change(field, *value))
        .collect();
    for handle in pending {
        join_logged("validation", handle).await;
    }
}

/// Await a spawned task, logging a join failure instead of dropping it.
async fn join_logged<T>(label: &str, handle: JoinHandle<T>) -> Option<T> {
    match handle.await {
        Ok(value) => Some(value),
        Err(e) => {
            error!("{} task failed: {}", label, e);
            None
        }
    }
}

fn print_state(label: &str, engine: &FormEngine) {
    match serde_json::to_string_pretty(&engine.state()) {
        Ok(json) => println!("== {}\n{}", label, json),
        Err(e) => eprintln!("Error: {}", e),
    }
}

#[tokio::main]
async fn main() {
    let log_file = File::create("formstate-cli.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let engine = match build_form() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    let mut submitting = engine.subscribe_submitting();
    tokio::spawn(async move {
        while submitting.changed().await.is_ok() {
            info!("submitting: {}", *submitting.borrow_and_update());
        }
    });

    apply_edits(
        &engine,
        &[("username", " admin "), ("email", "not-an-email"), ("zip", "12a")],
    )
    .await;
    print_state("after first edits", &engine);

    apply_edits(
        &engine,
        &[("username", "ferris"), ("email", "ferris@rust-lang.org"), ("zip", "1234 AB")],
    )
    .await;

    let on_submit = engine.handle_submit(|result: SubmitResult| {
        println!("== submitted (valid: {})", result.is_valid);
        if let Ok(json) = serde_json::to_string_pretty(&result.values) {
            println!("{}", json);
        }
    });

    let mut event = SubmitEvent::new();
    if let Some(handle) = on_submit(Some(&mut event)) {
        join_logged("submit", handle).await;
    }
    print_state("after submit", &engine);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_logged_returns_value() {
        let handle = tokio::spawn(async { 7 });
        assert_eq!(join_logged("test", handle).await, Some(7));
    }

    #[tokio::test]
    async fn test_join_logged_swallows_join_error() {
        let handle = tokio::spawn(async { std::future::pending::<()>().await });
        handle.abort();
        assert_eq!(join_logged("test", handle).await, None);
    }
}
