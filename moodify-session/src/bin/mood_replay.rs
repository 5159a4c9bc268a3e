//! mood-replay - drive a live session from recorded classifier output
//!
//! Each line of the script is one sampling tick:
//!
//! ```text
//! {"expressions": {"happy": 0.82, "neutral": 0.11, "sad": 0.07}}
//! {"label": "sad", "confidence": 0.9}
//! null                      # no face this tick
//! {"refresh": true}         # user pressed refresh
//! ```
//!
//! Session events are written to stdout as JSON lines; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::Parser;
use moodify_common::events::EventBus;
use moodify_common::Emotion;
use moodify_session::{
    ambient_weather, ChannelTicker, ClassifierError, ClassifierOutput, EmotionClassifier, Frame,
    FrameSampler, FrameSource, MoodSession, ProxyFetcher, SessionConfig, SessionError,
};
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mood-replay")]
#[command(about = "Replay recorded classifier output through a Moodify session")]
#[command(version)]
struct Args {
    /// JSON-lines script, one tick per line
    script: PathBuf,

    /// Base URL of a running moodify-proxy
    #[arg(long)]
    proxy_url: Option<String>,

    /// TOML config file (default: ~/.config/moodify/session.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the tick interval
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Latitude for the weather lookup
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude for the weather lookup
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// How long to wait for in-flight fetches after the last line
    #[arg(long, default_value = "3000")]
    settle_ms: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptLine {
    Expressions { expressions: BTreeMap<String, f32> },
    Label { label: Emotion, confidence: f32 },
    Refresh { refresh: bool },
}

enum Step {
    Observe(Option<ClassifierOutput>),
    Refresh,
}

fn parse_script(text: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split(" #").next().unwrap_or_default().trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed: Option<ScriptLine> = serde_json::from_str(line)
            .with_context(|| format!("line {}: not a valid script entry", index + 1))?;
        let step = match parsed {
            None => Step::Observe(None),
            Some(ScriptLine::Expressions { expressions }) => {
                Step::Observe(Some(ClassifierOutput::Scores(expressions.into_iter().collect())))
            }
            Some(ScriptLine::Label { label, confidence }) => {
                Step::Observe(Some(ClassifierOutput::Label { label, confidence }))
            }
            Some(ScriptLine::Refresh { refresh: true }) => Step::Refresh,
            Some(ScriptLine::Refresh { refresh: false }) => continue,
        };
        steps.push(step);
    }
    if steps.is_empty() {
        bail!("script has no entries");
    }
    Ok(steps)
}

/// Always has a frame; the scripted classifier ignores pixels anyway
struct StillFrame;

impl FrameSource for StillFrame {
    fn current_frame(&mut self) -> Option<Frame> {
        Some(Frame::new(1, 1, vec![0; 4]))
    }
}

/// Hands out queued outputs, one per classified frame
#[derive(Default)]
struct ScriptedClassifier {
    queue: Mutex<VecDeque<Option<ClassifierOutput>>>,
}

impl ScriptedClassifier {
    fn push(&self, output: Option<ClassifierOutput>) -> Result<()> {
        self.queue
            .lock()
            .map_err(|_| anyhow::anyhow!("classifier queue poisoned"))?
            .push_back(output);
        Ok(())
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for ScriptedClassifier {
    fn is_ready(&self) -> bool {
        true
    }

    async fn classify(&self, _frame: &Frame) -> Result<Option<ClassifierOutput>, ClassifierError> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| ClassifierError::Failed("classifier queue poisoned".to_string()))?;
        Ok(queue.pop_front().flatten())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = moodify_common::config::load_module_config(args.config.as_deref(), "session")
        .context("Failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| toml_config.logging.level.clone());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("moodify_session={},mood_replay={}", level, level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = SessionConfig::resolve(args.proxy_url.clone(), &toml_config)?;
    if let Some(ms) = args.interval_ms {
        config.tick_interval = Duration::from_millis(ms.max(1));
    }

    let script = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read {}", args.script.display()))?;
    let steps = parse_script(&script)?;
    info!(
        "Replaying {} steps from {} against {}",
        steps.len(),
        args.script.display(),
        config.proxy_url
    );

    let fetcher = Arc::new(ProxyFetcher::new(&config.proxy_url)?);

    let coordinates = args.lat.zip(args.lon);
    match ambient_weather(fetcher.as_ref(), coordinates, &config.fallback_city).await {
        Ok(weather) => info!(
            "Weather in {}: {}°C, {}",
            weather.location, weather.temperature, weather.condition
        ),
        Err(e) => warn!("Weather unavailable: {}", e),
    }

    let events = EventBus::new(256);
    let mut event_rx = events.subscribe();
    let printer = tokio::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            match event_rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Failed to encode event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => warn!("Event printer lagged, {} events skipped", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let classifier = Arc::new(ScriptedClassifier::default());
    let sampler = FrameSampler::new(Box::new(StillFrame), classifier.clone())
        .with_classify_timeout(config.classify_timeout);
    let session = MoodSession::new(config.stability, sampler, fetcher, events)?;
    let (ticks, ticker) = ChannelTicker::new(1);
    let (handle, task) = session.start(ticker);

    let drive = async {
        let mut interval = tokio::time::interval(config.tick_interval);
        for step in steps {
            interval.tick().await;
            match step {
                Step::Observe(output) => {
                    classifier.push(output)?;
                    ticks.send(()).await.map_err(|_| SessionError::Stopped)?;
                }
                Step::Refresh => match handle.refresh().await {
                    Ok(token) => info!("Refresh fired {}", token),
                    Err(SessionError::Trigger(e)) => warn!("{}", e),
                    Err(e) => return Err(e.into()),
                },
            }
        }
        tokio::time::sleep(Duration::from_millis(args.settle_ms)).await;
        anyhow::Ok(())
    };

    tokio::select! {
        result = drive => result?,
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, stopping replay"),
    }

    handle.stop();
    let snapshot = task.await.context("Session task failed")?;
    info!(
        "Final stable mood: {}",
        snapshot
            .stable_mood
            .map(|m| m.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    match serde_json::to_string_pretty(&snapshot.board) {
        Ok(board) => info!("Final board:\n{}", board),
        Err(e) => warn!("Failed to encode board: {}", e),
    }

    // Printer ends once the session drops the bus
    let _ = tokio::time::timeout(Duration::from_secs(1), printer).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = r#"
# warm-up
{"expressions": {"happy": 0.8, "sad": 0.2}}
null
{"label": "angry", "confidence": 0.7}   # shouting
{"refresh": true}
"#;
        let steps = parse_script(script).unwrap();
        assert_eq!(steps.len(), 4);
        assert!(matches!(steps[1], Step::Observe(None)));
        assert!(matches!(steps[3], Step::Refresh));
    }

    #[test]
    fn test_parse_script_rejects_garbage() {
        assert!(parse_script("{\"label\": \"bored\", \"confidence\": 1}").is_err());
        assert!(parse_script("# only comments\n").is_err());
    }
}
