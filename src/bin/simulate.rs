use clap::{Parser, ValueEnum};
use maze_chase_sim::autopilot;
use maze_chase_sim::config::Tuning;
use maze_chase_sim::constants::{ticks_to_ms, TICK_RATE};
use maze_chase_sim::engine::RoundController;
use maze_chase_sim::layout::MazeLayout;
use maze_chase_sim::rng::RandomSource;
use maze_chase_sim::types::{Mover, Outcome, RoundEvent, RoundSnapshot, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_MAX_TICKS: u64 = 10 * 60 * TICK_RATE as u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
enum RngKind {
    /// Built-in mulberry32 generator.
    Mulberry,
    /// `rand`'s seeded standard generator.
    Std,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,
    /// ASCII maze file; the built-in classic maze when omitted.
    #[arg(long)]
    layout: Option<PathBuf>,
    /// JSON tuning file; missing fields keep their defaults.
    #[arg(long)]
    tuning: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = RngKind::Mulberry)]
    rng: RngKind,
    /// Log every tick that produced round events.
    #[arg(long)]
    trace: bool,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RoundResultLine {
    round: u32,
    seed: u32,
    rng: RngKind,
    outcome: Outcome,
    ticks: u64,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    score: u32,
    level: u32,
    #[serde(rename = "remainingPickups")]
    remaining_pickups: usize,
    #[serde(rename = "pickupsEaten")]
    pickups_eaten: u32,
    #[serde(rename = "powerStarted")]
    power_started: u32,
    #[serde(rename = "adversariesEaten")]
    adversaries_eaten: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct RoundRun {
    result: RoundResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "roundCount")]
    round_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageTicks")]
    average_ticks: u64,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    rounds: Vec<RoundResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    round: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

#[derive(Clone, Copy, Debug)]
struct RunOptions<'a> {
    round: u32,
    seed: u32,
    rng: RngKind,
    max_ticks: u64,
    trace: bool,
    match_id: &'a str,
}

fn main() {
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let base_seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(base_seed, run_started_at_ms));

    let (layout, tuning) = match load_inputs(&cli) {
        Ok(inputs) => inputs,
        Err(error) => {
            emit_log(
                "error",
                "setup_failed",
                &match_id,
                None,
                None,
                None,
                json!({ "error": error }),
            );
            std::process::exit(2);
        }
    };

    let mut has_anomaly = false;
    let mut round_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for round in 0..cli.rounds {
        let options = RunOptions {
            round,
            seed: base_seed.wrapping_add(round),
            rng: cli.rng,
            max_ticks: cli.max_ticks,
            trace: cli.trace,
            match_id: &match_id,
        };
        emit_log(
            "info",
            "round_started",
            &match_id,
            Some(round),
            Some(options.seed),
            None,
            json!({
                "rng": options.rng,
                "maxTicks": options.max_ticks,
                "width": layout.width(),
                "height": layout.height(),
                "adversaries": layout.adversaries.len(),
            }),
        );

        let built = match cli.rng {
            RngKind::Mulberry => RoundController::new(&layout, tuning.clone(), options.seed)
                .map(|controller| run_round(controller, &options)),
            RngKind::Std => RoundController::with_random(
                &layout,
                tuning.clone(),
                StdRng::seed_from_u64(options.seed as u64),
            )
            .map(|controller| run_round(controller, &options)),
        };
        let round_run = match built {
            Ok(round_run) => round_run,
            Err(error) => {
                emit_log(
                    "error",
                    "layout_rejected",
                    &match_id,
                    Some(round),
                    Some(options.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &round_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(round),
                Some(options.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !round_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += round_run.anomaly_records.len();
        *outcome_counts
            .entry(outcome_key(round_run.result.outcome))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "round_finished",
            &match_id,
            Some(round),
            Some(options.seed),
            Some(round_run.result.ticks),
            json!({
                "outcome": round_run.result.outcome,
                "score": round_run.result.score,
                "remainingPickups": round_run.result.remaining_pickups,
                "anomalyCount": round_run.anomaly_records.len(),
            }),
        );

        if let Ok(line) = serde_json::to_string(&round_run.result) {
            println!("{line}");
        }
        round_results.push(round_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        now_ms(),
        round_results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "roundCount": summary.round_count,
            "anomalyCount": summary.anomaly_count,
            "averageTicks": summary.average_ticks,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn load_inputs(cli: &Cli) -> Result<(MazeLayout, Tuning), String> {
    let layout = match cli.layout.as_ref() {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|error| format!("{}: {error}", path.to_string_lossy()))?;
            parse_layout_text(&text).map_err(|error| error.to_string())?
        }
        None => MazeLayout::classic().map_err(|error| error.to_string())?,
    };
    let tuning = match cli.tuning.as_ref() {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|error| format!("{}: {error}", path.to_string_lossy()))?;
            Tuning::from_json_str(&text)
                .map_err(|error| format!("{}: {error}", path.to_string_lossy()))?
        }
        None => Tuning::default(),
    };
    Ok((layout, tuning))
}

/// Layout files may end with blank lines; those are not maze rows.
fn parse_layout_text(text: &str) -> maze_chase_sim::error::MazeResult<MazeLayout> {
    let rows: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    let end = rows
        .iter()
        .rposition(|row| !row.is_empty())
        .map(|idx| idx + 1)
        .unwrap_or(0);
    MazeLayout::parse(&rows[..end])
}

fn run_round<R: RandomSource>(
    mut controller: RoundController<R>,
    options: &RunOptions<'_>,
) -> RoundRun {
    let max_combo = controller.tuning().max_combo;
    let power_duration = controller.tuning().power_duration_ticks;
    let mut snapshot = controller.snapshot();
    let mut pickups_eaten = 0;
    let mut power_started = 0;
    let mut adversaries_eaten = 0;
    let mut lives_lost = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();

    while !controller.is_ended() {
        if snapshot.tick >= options.max_ticks {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                "tick limit reached before the round ended".to_string(),
            );
            break;
        }

        let input = autopilot::next_input(controller.grid(), &snapshot);
        let previous = snapshot;
        snapshot = controller.tick(input);

        for message in collect_snapshot_anomalies(
            &previous,
            &snapshot,
            max_combo,
            power_duration,
            |pos, mover| match mover {
                Mover::Player => controller.grid().is_passable(pos, mover),
                Mover::Adversary => controller.grid().is_walkable(pos),
            },
        ) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        for event in &snapshot.events {
            match event {
                RoundEvent::PickupEaten { .. } => pickups_eaten += 1,
                RoundEvent::PowerStarted { .. } | RoundEvent::PowerRefreshed { .. } => {
                    pickups_eaten += 1;
                    power_started += 1;
                }
                RoundEvent::AdversaryEaten { .. } => adversaries_eaten += 1,
                RoundEvent::PlayerCaught { .. } => lives_lost += 1,
                _ => {}
            }
        }

        if options.trace && !snapshot.events.is_empty() {
            emit_log(
                "debug",
                "tick",
                options.match_id,
                Some(options.round),
                Some(options.seed),
                Some(snapshot.tick),
                json!({
                    "input": input,
                    "player": { "x": snapshot.player.x, "y": snapshot.player.y },
                    "score": snapshot.score,
                    "lives": controller.lives(),
                    "events": snapshot.events,
                }),
            );
        }
    }

    RoundRun {
        result: RoundResultLine {
            round: options.round,
            seed: options.seed,
            rng: options.rng,
            outcome: snapshot.outcome,
            ticks: snapshot.tick,
            duration_ms: ticks_to_ms(snapshot.tick),
            score: snapshot.score,
            level: controller.level(),
            remaining_pickups: snapshot.remaining_pickups,
            pickups_eaten,
            power_started,
            adversaries_eaten,
            lives_lost,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_snapshot_anomalies<F>(
    previous: &RoundSnapshot,
    snapshot: &RoundSnapshot,
    max_combo: u32,
    power_duration: u32,
    can_stand: F,
) -> Vec<String>
where
    F: Fn(Vec2, Mover) -> bool,
{
    let mut anomalies = Vec::new();

    let player = Vec2::new(snapshot.player.x, snapshot.player.y);
    if !can_stand(player, Mover::Player) {
        anomalies.push(format!("player on blocked cell: ({},{})", player.x, player.y));
    }
    for adversary in &snapshot.adversaries {
        let pos = Vec2::new(adversary.x, adversary.y);
        if !can_stand(pos, Mover::Adversary) {
            anomalies.push(format!(
                "adversary {} on wall: ({},{})",
                adversary.id, pos.x, pos.y
            ));
        }
    }

    if snapshot.score < previous.score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            previous.score, snapshot.score
        ));
    }
    if snapshot.remaining_pickups > previous.remaining_pickups {
        anomalies.push(format!(
            "remaining pickups increased: {} -> {}",
            previous.remaining_pickups, snapshot.remaining_pickups
        ));
    }
    if snapshot.combo == 0 || snapshot.combo > max_combo {
        anomalies.push(format!(
            "combo out of range: {}/{}",
            snapshot.combo, max_combo
        ));
    }
    if snapshot.power_timer > power_duration {
        anomalies.push(format!(
            "power timer above duration: {}/{}",
            snapshot.power_timer, power_duration
        ));
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    rounds: Vec<RoundResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let round_count = rounds.len();
    let (average_ticks, average_score) = if round_count == 0 {
        (0, 0)
    } else {
        let total_ticks: u64 = rounds.iter().map(|round| round.ticks).sum();
        let total_score: u64 = rounds.iter().map(|round| round.score as u64).sum();
        (
            total_ticks / round_count as u64,
            (total_score / round_count as u64) as u32,
        )
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        round_count,
        anomaly_count,
        average_ticks,
        average_score,
        outcome_counts,
        rounds,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    round: Option<u32>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        round,
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn outcome_key(outcome: Outcome) -> String {
    match outcome {
        Outcome::InProgress => "in_progress",
        Outcome::Won => "won",
        Outcome::Lost => "lost",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_round_result(outcome: Outcome, ticks: u64, score: u32) -> RoundResultLine {
        RoundResultLine {
            round: 0,
            seed: 42,
            rng: RngKind::Mulberry,
            outcome,
            ticks,
            duration_ms: ticks_to_ms(ticks),
            score,
            level: 1,
            remaining_pickups: 0,
            pickups_eaten: 0,
            power_started: 0,
            adversaries_eaten: 0,
            lives_lost: 0,
            anomalies: Vec::new(),
        }
    }

    fn options(match_id: &str) -> RunOptions<'_> {
        RunOptions {
            round: 0,
            seed: 7,
            rng: RngKind::Mulberry,
            max_ticks: 3_000,
            trace: false,
            match_id,
        }
    }

    #[test]
    fn default_match_id_contains_seed_and_timestamp() {
        assert_eq!(default_match_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_calculates_averages() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_round_result(Outcome::Won, 600, 2_000),
                make_round_result(Outcome::Lost, 900, 1_000),
            ],
            BTreeMap::from([("won".to_string(), 1usize), ("lost".to_string(), 1usize)]),
            0,
        );
        assert_eq!(summary.average_ticks, 750);
        assert_eq!(summary.average_score, 1_500);
        assert_eq!(summary.round_count, 2);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let now = now_ms();
        let target = std::env::temp_dir()
            .join(format!("maze-chase-missing-{now}"))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_round_result(Outcome::Won, 60, 10)],
            BTreeMap::from([("won".to_string(), 1usize)]),
            0,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same anomaly".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same anomaly".to_string());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tick, 10);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn snapshot_anomalies_flag_score_drop_and_bad_combo() {
        let layout = MazeLayout::classic().expect("classic parses");
        let controller =
            RoundController::new(&layout, Tuning::default(), 1).expect("classic playable");
        let previous = controller.snapshot();
        let mut broken = previous.clone();
        broken.score = 0;
        broken.combo = 0;
        let mut earlier = previous.clone();
        earlier.score = 50;

        let anomalies = collect_snapshot_anomalies(&earlier, &broken, 4, 60, |_, _| true);
        assert_eq!(
            anomalies,
            vec![
                "score decreased: 50 -> 0".to_string(),
                "combo out of range: 0/4".to_string(),
            ]
        );
        assert!(collect_snapshot_anomalies(&previous, &previous, 4, 60, |_, _| true).is_empty());
    }

    #[test]
    fn layout_text_ignores_trailing_blank_lines() {
        let layout = parse_layout_text("#####\r\n#Po.#\r\n#.W #\r\n#####\n\n")
            .expect("layout parses");
        assert_eq!(layout.height(), 4);
        assert_eq!(layout.player_start, Vec2::new(1, 1));
    }

    #[test]
    fn classic_round_runs_clean_and_repeats_for_same_seed() {
        let layout = MazeLayout::classic().expect("classic parses");
        let first = run_round(
            RoundController::new(&layout, Tuning::default(), 7).expect("classic playable"),
            &options("sim-test"),
        );
        let second = run_round(
            RoundController::new(&layout, Tuning::default(), 7).expect("classic playable"),
            &options("sim-test"),
        );

        assert!(first
            .result
            .anomalies
            .iter()
            .all(|message| message.starts_with("tick limit")));
        assert_eq!(first.result.outcome, second.result.outcome);
        assert_eq!(first.result.score, second.result.score);
        assert_eq!(first.result.ticks, second.result.ticks);
        assert!(first.result.pickups_eaten > 0);
    }

    #[test]
    fn std_rng_rounds_are_reproducible() {
        let layout = MazeLayout::classic().expect("classic parses");
        let run = |seed: u64| {
            let controller = RoundController::with_random(
                &layout,
                Tuning::default(),
                StdRng::seed_from_u64(seed),
            )
            .expect("classic playable");
            run_round(controller, &options("sim-std")).result
        };
        let a = run(3);
        let b = run(3);
        assert_eq!(a.score, b.score);
        assert_eq!(a.ticks, b.ticks);
    }
}
