//! CLI command implementations

use crate::output::format_output;
use crate::PropsArgs;
use anyhow::{bail, Context};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};
use tube_player_core::{
    resolve_poster, ContextMenuEvent, ContextMenuState, EngineEvent, ImageCdn, MenuTransition,
    PlaybackControl, Position, SimulatedEngine, VideoPlayer, VideoPlayerProps, DEFAULT_CONTROLS,
};

/// Load props from a JSON file or from individual flags
pub fn load_props(args: &PropsArgs) -> anyhow::Result<VideoPlayerProps> {
    let mut props = match (&args.props, &args.source) {
        (Some(path), _) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read props file {}", path.display()))?;
            VideoPlayerProps::from_json(&json)
                .with_context(|| format!("Invalid props in {}", path.display()))?
        }
        (None, Some(source)) => VideoPlayerProps::new(source.clone(), args.poster.clone()),
        (None, None) => bail!("either --props or --source is required"),
    };

    if let Some(time) = args.time {
        props.time = Some(time);
    }
    Ok(props)
}

/// Knobs for a simulation run
#[derive(Debug, Clone)]
pub struct SimulateSettings {
    pub events: Vec<String>,
    pub renders: u32,
    pub right_clicks: Vec<Position>,
    pub hide: bool,
    pub unbound: bool,
    pub delay_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct EventOutcome {
    pub event: EngineEvent,
    pub listeners: usize,
    pub current_time: f64,
}

/// Result of a simulation run
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub player_id: String,
    pub source: String,
    pub poster: String,
    pub seek_target: f64,
    pub renders: u64,
    pub events: Vec<EventOutcome>,
    pub current_time: f64,
    pub seeks: Vec<f64>,
    pub subscribe_calls: usize,
    pub ready_listeners: usize,
    pub metadata_listeners: usize,
    pub menu_transitions: Vec<MenuTransition>,
    pub menu: ContextMenuState,
    pub menu_items: usize,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation for player {}", self.player_id)?;
        writeln!(f, "  Source: {}", self.source)?;
        writeln!(f, "  Poster: {}", self.poster)?;
        writeln!(f, "  Seek target: {}s", self.seek_target)?;
        writeln!(f, "  Renders: {}", self.renders)?;

        writeln!(f, "\nEvents:")?;
        if self.events.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (i, e) in self.events.iter().enumerate() {
            writeln!(
                f,
                "  {}. {} -> {} listener(s), currentTime = {}",
                i + 1,
                e.event,
                e.listeners,
                e.current_time
            )?;
        }

        writeln!(f, "\nEngine:")?;
        writeln!(f, "  currentTime: {}", self.current_time)?;
        writeln!(f, "  Seeks: {:?}", self.seeks)?;
        writeln!(f, "  Subscribe calls: {}", self.subscribe_calls)?;
        writeln!(
            f,
            "  Live listeners: ready={}, loadedmetadata={}",
            self.ready_listeners, self.metadata_listeners
        )?;

        writeln!(f, "\nContext menu:")?;
        for t in &self.menu_transitions {
            writeln!(f, "  {:?}", t)?;
        }
        match self.menu.position() {
            Some(p) => write!(f, "  Visible at {} with {} item(s)", p, self.menu_items),
            None => write!(f, "  Hidden"),
        }
    }
}

/// Mount a player on a simulated engine and replay events
pub async fn simulate(
    args: &PropsArgs,
    settings: SimulateSettings,
    format: &str,
) -> anyhow::Result<()> {
    let props = load_props(args)?;
    let events = settings
        .events
        .iter()
        .filter(|e| !e.trim().is_empty())
        .map(|e| e.parse::<EngineEvent>())
        .collect::<Result<Vec<_>, _>>()?;

    let engine = if settings.unbound {
        SimulatedEngine::without_source()
    } else {
        SimulatedEngine::new()
    };
    let mut player = VideoPlayer::new(props, engine.clone());

    for _ in 0..settings.renders.max(1) {
        player.render()?;
    }
    info!(player = %player.id(), renders = settings.renders.max(1), "Player rendered");

    let delay = Duration::from_millis(settings.delay_ms);
    let mut outcomes = Vec::with_capacity(events.len());
    for event in events {
        tokio::time::sleep(delay).await;
        let listeners = engine.emit(event);
        debug!(%event, listeners, "Event fired");
        outcomes.push(EventOutcome {
            event,
            listeners,
            current_time: engine.current_time(),
        });
    }

    let mut transitions = Vec::new();
    for position in &settings.right_clicks {
        let mut event = ContextMenuEvent::new(position.x, position.y);
        transitions.push(player.on_context_menu(&mut event));
    }
    if settings.hide {
        transitions.push(player.hide_context_menu());
    }

    let view = player.render()?;

    let report = SimulationReport {
        player_id: player.id().to_string(),
        source: view.source.uri.clone(),
        poster: view.source.poster.clone(),
        seek_target: player
            .adapter()
            .seek_target()
            .map(|s| s.seconds())
            .unwrap_or_default(),
        renders: player.adapter().render_count(),
        events: outcomes,
        current_time: engine.current_time(),
        seeks: engine.seeks(),
        subscribe_calls: engine.subscribe_count(),
        ready_listeners: engine.listener_count(EngineEvent::Ready),
        metadata_listeners: engine.listener_count(EngineEvent::LoadedMetadata),
        menu_transitions: transitions,
        menu: player.menu_state(),
        menu_items: view.menu.map(|m| m.items.len()).unwrap_or(0),
    };

    println!("{}", format_output(&report, format));

    player.unmount()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct OptionsReport {
    source: serde_json::Value,
    options: serde_json::Value,
}

impl fmt::Display for OptionsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = serde_json::to_string_pretty(&self.source).map_err(|_| fmt::Error)?;
        let options = serde_json::to_string_pretty(&self.options).map_err(|_| fmt::Error)?;
        writeln!(f, "Source:\n{}", source)?;
        write!(f, "\nOptions:\n{}", options)
    }
}

/// Print the engine objects for a set of props
pub fn options(args: &PropsArgs, format: &str) -> anyhow::Result<()> {
    let props = load_props(args)?;
    let cdn = ImageCdn::default();
    let source = tube_player_core::PlaybackSource::resolve(&props.source, &props.poster, &cdn);

    let report = OptionsReport {
        source: source.to_plyr(),
        options: serde_json::to_value(props.options().to_plyr())?,
    };
    println!("{}", format_output(&report, format));
    Ok(())
}

#[derive(Debug, Serialize)]
struct PosterReport {
    raw: String,
    resolved: String,
    fallback: bool,
}

impl fmt::Display for PosterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolved)?;
        if self.fallback {
            write!(f, " (fallback to source)")?;
        }
        Ok(())
    }
}

/// Resolve a poster through the image CDN
pub fn poster(
    raw: &str,
    source: &str,
    transform: Option<String>,
    format: &str,
) -> anyhow::Result<()> {
    let mut cdn = ImageCdn::default();
    if let Some(transform) = transform {
        cdn = cdn.with_transform(transform);
    }

    let resolved = resolve_poster(source, raw, &cdn);
    let report = PosterReport {
        raw: raw.to_string(),
        fallback: resolved == source,
        resolved,
    };
    println!("{}", format_output(&report, format));
    Ok(())
}

#[derive(Debug, Serialize)]
struct ControlsReport {
    controls: Vec<&'static str>,
}

impl fmt::Display for ControlsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Default controls:")?;
        for (i, c) in self.controls.iter().enumerate() {
            writeln!(f, "  {:>2}. {}", i + 1, c)?;
        }
        Ok(())
    }
}

/// List the default controls
pub fn controls(format: &str) {
    let report = ControlsReport {
        controls: DEFAULT_CONTROLS.iter().map(|c| c.as_str()).collect(),
    };
    println!("{}", format_output(&report, format));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(source: Option<&str>) -> PropsArgs {
        PropsArgs {
            props: None,
            source: source.map(String::from),
            poster: String::new(),
            time: Some(12.0),
        }
    }

    #[test]
    fn test_load_props_from_flags() {
        let props = load_props(&args(Some("https://v/a.mp4"))).unwrap();
        assert_eq!(props.source, "https://v/a.mp4");
        assert_eq!(props.time, Some(12.0));
    }

    #[test]
    fn test_load_props_requires_source() {
        assert!(load_props(&args(None)).is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_simulate_runs() {
        let settings = SimulateSettings {
            events: vec!["ready".into(), "loadedmetadata".into()],
            renders: 2,
            right_clicks: vec![Position::new(4.0, 4.0)],
            hide: false,
            unbound: false,
            delay_ms: 0,
        };
        simulate(&args(Some("https://v/a.mp4")), settings, "json")
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_simulate_rejects_unknown_event() {
        let settings = SimulateSettings {
            events: vec!["seeked".into()],
            renders: 1,
            right_clicks: vec![],
            hide: false,
            unbound: false,
            delay_ms: 0,
        };
        assert!(simulate(&args(Some("https://v/a.mp4")), settings, "text")
            .await
            .is_err());
    }
}
