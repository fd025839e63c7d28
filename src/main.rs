//! Vaani - Voice/Text Translation Front-End
//!
//! Entry point wiring the CLI to the translation pipeline. Heavy lifting
//! (recognition, translation, sentiment, synthesis) is delegated to external
//! services; everything here is orchestration.

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vaani::cli::{Args, Commands};
use vaani::config::Config;
use vaani::dialect::DialectStyle;
use vaani::error::VaaniError;
use vaani::languages;
use vaani::pipeline::{Pipeline, SourceMode, SpeakOutcome, TranslateRequest};
use vaani::speech::AudioBuffer;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let mut pipeline = Pipeline::from_config(&config)?;

    match args.command {
        Commands::Translate {
            text,
            audio,
            target,
            source,
            source_mode,
            dialect,
            sentiment,
            speak,
            voice,
        } => {
            let audio = match audio {
                Some(path) => Some(AudioBuffer::new(std::fs::read(&path)?)),
                None => None,
            };

            let request = TranslateRequest {
                audio,
                text,
                source: parse_source_mode(source, &source_mode)?,
                target: target.clone(),
                dialect: DialectStyle::parse(&dialect)?,
                sentiment: sentiment || config.sentiment.enabled,
            };

            match pipeline.translate(request).await {
                Ok(outcome) => {
                    println!("Detected language: {}", outcome.detected_language);
                    println!("{}", outcome.text);
                    println!("{}", outcome.status);

                    if speak {
                        report_speech(pipeline.speak(&outcome.text, voice.as_deref(), &target).await);
                    }
                }
                Err(e) => println!("{}", user_message(e)),
            }
        }
        Commands::Detect { text } => {
            println!("{}", pipeline.detect(&text).await);
        }
        Commands::Speak {
            text,
            language,
            voice,
        } => {
            report_speech(pipeline.speak(&text, voice.as_deref(), &language).await);
        }
        Commands::Record { seconds, language } => {
            println!("{}", pipeline.start_recording());
            tokio::time::sleep(std::time::Duration::from_secs(seconds)).await;
            let (text, status) = pipeline.stop_recording(language.as_deref()).await;
            println!("{}", status);
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        Commands::Languages => {
            println!("Supported languages:");
            for entry in languages::LANGUAGES {
                println!("  {:<25} {}", entry.name, entry.code);
            }
        }
        Commands::Session { target } => {
            run_session(&mut pipeline, target).await?;
        }
    }

    Ok(())
}

/// Interactive loop mirroring the original form: type to translate, slash
/// commands for everything else.
async fn run_session(pipeline: &mut Pipeline, mut target: String) -> Result<()> {
    let mut dialect = DialectStyle::Standard;
    let mut sentiment = false;
    let mut source = SourceMode::ServiceAuto;
    let mut last_output = String::new();

    println!("Vaani session. Type text to translate, or /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_prompt(&target, dialect);
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            match parts.next().unwrap_or("") {
                "help" => print_session_help(),
                "quit" | "exit" => break,
                "target" => match parts.next() {
                    Some(_) => {
                        let rest = command["target".len()..].trim();
                        if languages::resolve_to_code(rest).is_some() {
                            target = rest.to_string();
                            println!("Target language: {}", target);
                        } else {
                            println!("Unknown language: {}", rest);
                        }
                    }
                    None => println!("Usage: /target <language>"),
                },
                "dialect" => {
                    let rest = command["dialect".len()..].trim();
                    match DialectStyle::parse(rest) {
                        Ok(style) => {
                            dialect = style;
                            println!("Dialect: {}", dialect.label());
                        }
                        Err(e) => println!("{}", e),
                    }
                }
                "sentiment" => {
                    sentiment = matches!(parts.next(), Some("on"));
                    println!("Sentiment: {}", if sentiment { "on" } else { "off" });
                }
                "source" => match parts.next() {
                    Some("auto") => {
                        source = SourceMode::ServiceAuto;
                        println!("Source: service-side auto detection");
                    }
                    Some("detected") => {
                        source = SourceMode::Detected;
                        println!("Source: locally detected language");
                    }
                    Some(_) => {
                        let rest = command["source".len()..].trim();
                        source = SourceMode::Declared(rest.to_string());
                        println!("Source: {}", rest);
                    }
                    None => println!("Usage: /source auto|detected|<language>"),
                },
                "record" => println!("{}", pipeline.start_recording()),
                "stop" => {
                    let (text, status) = pipeline.stop_recording(None).await;
                    println!("{}", status);
                    if !text.is_empty() {
                        translate_line(pipeline, &text, &source, &target, dialect, sentiment, &mut last_output)
                            .await;
                    }
                }
                "play" => {
                    report_speech(pipeline.speak(&last_output, None, &target).await);
                }
                "history" => println!("{}", pipeline.render_history()),
                "slang" => {
                    let words: Vec<&str> = parts.collect();
                    if words.len() == 3 {
                        match pipeline.add_slang(words[0], words[1], words[2]) {
                            Ok(message) => println!("{}", message),
                            Err(e) => println!("{}", user_message(e)),
                        }
                    } else {
                        println!("Usage: /slang <formal> <styled> <language>");
                    }
                }
                "languages" => {
                    for name in languages::names() {
                        println!("  {}", name);
                    }
                }
                other => println!("Unknown command: /{}", other),
            }
            continue;
        }

        translate_line(pipeline, &line, &source, &target, dialect, sentiment, &mut last_output).await;
    }

    Ok(())
}

async fn translate_line(
    pipeline: &mut Pipeline,
    text: &str,
    source: &SourceMode,
    target: &str,
    dialect: DialectStyle,
    sentiment: bool,
    last_output: &mut String,
) {
    let request = TranslateRequest {
        audio: None,
        text: Some(text.to_string()),
        source: source.clone(),
        target: target.to_string(),
        dialect,
        sentiment,
    };

    match pipeline.translate(request).await {
        Ok(outcome) => {
            println!("[{} | {}]", outcome.detected_language, outcome.mode_description);
            println!("{}", outcome.text);
            println!("{}", outcome.status);
            *last_output = outcome.text;
        }
        Err(e) => println!("{}", user_message(e)),
    }
}

fn print_prompt(target: &str, dialect: DialectStyle) {
    use std::io::Write;
    print!("[{} | {}] > ", target, dialect.label());
    let _ = std::io::stdout().flush();
}

fn print_session_help() {
    println!("Commands:");
    println!("  /target <language>            set the target language");
    println!("  /dialect <style>              standard, regional-slang, casual-slang,");
    println!("                                archaic, formal-to-casual, prose-to-poetry");
    println!("  /sentiment on|off             toggle the sentiment emoji");
    println!("  /source auto|detected|<lang>  choose the source language mode");
    println!("  /record, /stop                start/stop a recording session");
    println!("  /play                         speak the last translation");
    println!("  /history                      show past translations");
    println!("  /slang <formal> <styled> <lang>  add a custom slang entry");
    println!("  /languages                    list supported languages");
    println!("  /quit                         leave the session");
}

fn report_speech(result: vaani::error::Result<SpeakOutcome>) {
    match result {
        Ok(SpeakOutcome::Played) => println!("Played."),
        Ok(SpeakOutcome::Saved(path)) => println!("Audio saved: {}", path.display()),
        Ok(SpeakOutcome::NothingToPlay) => println!("Nothing to play."),
        Err(e) => println!("{}", user_message(e)),
    }
}

/// Every failure reaching the CLI becomes a plain message, never a crash.
fn user_message(error: VaaniError) -> String {
    error.to_string()
}

/// Parse the source mode flags: an explicit --source wins, otherwise the
/// --source-mode string picks between the two detection variants.
fn parse_source_mode(source: Option<String>, mode: &str) -> Result<SourceMode> {
    if let Some(selector) = source {
        return Ok(SourceMode::Declared(selector));
    }

    match mode.to_lowercase().as_str() {
        "auto" => Ok(SourceMode::ServiceAuto),
        "detected" => Ok(SourceMode::Detected),
        _ => Err(VaaniError::Config(format!(
            "Invalid source mode '{}'. Valid modes: auto, detected",
            mode
        ))
        .into()),
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let vaani_dir = std::env::current_dir()?.join(".vaani");
    let log_dir = vaani_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "vaani.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
