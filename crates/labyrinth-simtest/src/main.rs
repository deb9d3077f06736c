//! Labyrinth Headless Generation Harness
//!
//! Runs maze generation end to end and checks the layout, pool and
//! navigation properties round after round. Runs entirely in-process: no
//! renderer, no physics, no input.
//!
//! Usage:
//!   cargo run -p labyrinth-simtest
//!   cargo run -p labyrinth-simtest -- --verbose
//!   cargo run -p labyrinth-simtest -- --json

use labyrinth_core::config::{DecorationEntry, DecorationSettings, MazeConfig, RoundConfig, Template};
use labyrinth_core::engine::{MazeEngine, MazeQueries};
use labyrinth_core::persistence::{load_snapshot, save_snapshot, MazeSnapshot};
use labyrinth_logic::connectivity::{flood_fill, is_fully_connected, shortest_path};
use labyrinth_logic::grid::{CellCoord, Direction};
use labyrinth_logic::spatial::Vec3;
use labyrinth_logic::topology::generate_topology;
use labyrinth_logic::validation::{check_border_walls, has_errors};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

// ── Maze config (same JSON the game ships) ──────────────────────────────
const CONFIG_JSON: &str = include_str!("../../../data/maze_config.json");

const SEED: u64 = 0x1AB7;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    section: &'static str,
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(section: &'static str, name: &str, passed: bool, detail: String) -> Self {
        Self {
            section,
            name: name.into(),
            passed,
            detail,
        }
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    if !json {
        println!("=== Labyrinth Generation Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Shipped config
    let config = match validate_config(&mut results) {
        Some(config) => config,
        None => MazeConfig::default(),
    };

    // 2. Topology sweep
    results.extend(validate_topology(verbose && !json));

    // 3. Scenarios A–D
    results.extend(validate_scenarios(&config));

    // 4. Pool reuse
    results.extend(validate_pool(&config));

    // 5. Decoration spacing
    results.extend(validate_decorations(&config));

    // 6. Navigation queries
    results.extend(validate_navigation(&config));

    // 7. Snapshots
    results.extend(validate_snapshots(&config));

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("failed to encode results: {}", e),
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} [{}] {}: {}", icon, r.section, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            results.len(),
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn engine(config: &MazeConfig, seed: u64) -> MazeEngine {
    MazeEngine::new(config.clone().with_seed(seed))
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn validate_config(results: &mut Vec<TestResult>) -> Option<MazeConfig> {
    let config = match MazeConfig::from_json_str(CONFIG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult::new("config", "config_parse", false, e.to_string()));
            return None;
        }
    };

    results.push(TestResult::new(
        "config",
        "structural_templates",
        config.structural().is_ok(),
        "floor, wall and ceiling configured".into(),
    ));

    let resolved = config.resolve_catalog();
    results.push(TestResult::new(
        "config",
        "catalog_resolves",
        !resolved.is_empty(),
        format!(
            "{} of {} catalog entries have templates",
            resolved.len(),
            config.decorations.catalog.len()
        ),
    ));

    let bad_probability = config
        .decorations
        .catalog
        .iter()
        .filter(|e| !(0.0..=1.0).contains(&e.probability))
        .count();
    results.push(TestResult::new(
        "config",
        "catalog_probabilities",
        bad_probability == 0,
        format!("{} entries outside 0..=1", bad_probability),
    ));

    Some(config)
}

// ── 2. Topology ─────────────────────────────────────────────────────────

fn validate_topology(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let probabilities = [0u8, 25, 50, 75, 100];

    let mut grids = 0;
    let mut disconnected = Vec::new();
    let mut open_border = Vec::new();
    for rows in 2..=12 {
        for cols in 2..=12 {
            for &p in &probabilities {
                let seed = SEED + (rows * 1000 + cols * 10) as u64 + p as u64;
                let grid = generate_topology(rows, cols, p, &mut StdRng::seed_from_u64(seed));
                grids += 1;
                if !is_fully_connected(&grid) {
                    disconnected.push(format!("{}x{} p={}", rows, cols, p));
                }
                if !check_border_walls(&grid).is_empty() {
                    open_border.push(format!("{}x{} p={}", rows, cols, p));
                }
            }
        }
    }
    if verbose {
        println!("  topology sweep: {} grids", grids);
    }

    results.push(TestResult::new(
        "topology",
        "connectivity_sweep",
        disconnected.is_empty(),
        if disconnected.is_empty() {
            format!("{} grids fully connected", grids)
        } else {
            format!("disconnected: {}", disconnected.join(", "))
        },
    ));
    results.push(TestResult::new(
        "topology",
        "border_sweep",
        open_border.is_empty(),
        if open_border.is_empty() {
            format!("{} grids fully bordered", grids)
        } else {
            format!("open border: {}", open_border.join(", "))
        },
    ));

    let a = generate_topology(15, 15, 50, &mut StdRng::seed_from_u64(SEED));
    let b = generate_topology(15, 15, 50, &mut StdRng::seed_from_u64(SEED));
    results.push(TestResult::new(
        "topology",
        "deterministic",
        a.wall_layout() == b.wall_layout(),
        "same seed, same wall layout".into(),
    ));

    let path = shortest_path(&a, CellCoord::new(0, 0), CellCoord::new(14, 14));
    results.push(TestResult::new(
        "topology",
        "corner_to_corner_path",
        path.is_some(),
        match path {
            Some(p) => format!("{} steps", p.len() - 1),
            None => "no path".into(),
        },
    ));

    results
}

// ── 3. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(config: &MazeConfig) -> Vec<TestResult> {
    let mut results = Vec::new();

    // A: 5×5, border row, full flood fill
    let mut maze = engine(config, SEED);
    match maze.generate(RoundConfig::new(5, 5, 50)) {
        Ok(report) => {
            let grid = maze.grid();
            let row0 = grid.map_or(0, |g| {
                (0..5)
                    .filter(|&c| g.get(0, c).map_or(false, |cell| cell.has_wall(Direction::Up)))
                    .count()
            });
            let reached = grid.map_or(0, |g| flood_fill(g, 0, 0).iter().filter(|v| **v).count());
            results.push(TestResult::new(
                "scenario",
                "a_five_by_five",
                report.cells == 25 && row0 == 5 && reached == 25,
                format!("{} cells, {} top walls, {} reached", report.cells, row0, reached),
            ));
        }
        Err(e) => results.push(TestResult::new("scenario", "a_five_by_five", false, e.to_string())),
    }

    // B: two 10×10 rounds back to back
    let mut maze = engine(config, SEED + 1);
    let first = maze.generate(RoundConfig::new(10, 10, 50));
    let second = maze.generate(RoundConfig::new(10, 10, 50));
    match (first, second) {
        (Ok(first), Ok(second)) => results.push(TestResult::new(
            "scenario",
            "b_round_two_reuses_pool",
            second.new_pieces * 4 < first.new_pieces,
            format!(
                "round 1 created {}, round 2 created {}",
                first.new_pieces, second.new_pieces
            ),
        )),
        _ => results.push(TestResult::new(
            "scenario",
            "b_round_two_reuses_pool",
            false,
            "generation failed".into(),
        )),
    }

    // C: random points on an open 5×5
    let mut maze = engine(config, SEED + 2);
    let c_ok = maze.generate(RoundConfig::new(5, 5, 0)).is_ok();
    let (width, height) = maze.maze_size();
    let outside = (0..1000)
        .map(|_| maze.random_point())
        .filter(|p| p.x < 0.0 || p.x > width || p.z < 0.0 || p.z > height)
        .count();
    results.push(TestResult::new(
        "scenario",
        "c_random_points_in_bounds",
        c_ok && outside == 0,
        format!("{} of 1000 points outside {}x{}", outside, width, height),
    ));

    // D: one guaranteed decoration per open cell
    let mut d_config = config.clone();
    d_config.decorations = DecorationSettings {
        per_cell_cap: 1,
        catalog: vec![DecorationEntry::new(
            Template::new("crate").with_size(0.8, 0.8, 0.8),
            1.0,
            0.0,
        )],
        ..DecorationSettings::default()
    };
    let mut maze = engine(&d_config, SEED + 3);
    let placed = maze
        .generate(RoundConfig::new(5, 5, 0))
        .map(|r| r.decorations.placed)
        .unwrap_or(0);
    results.push(TestResult::new(
        "scenario",
        "d_one_decoration_per_cell",
        placed == 25,
        format!("{} decorations on 25 cells", placed),
    ));

    results
}

// ── 4. Pool ─────────────────────────────────────────────────────────────

fn validate_pool(config: &MazeConfig) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut maze = engine(config, SEED + 4);
    let mut failures = 0;
    for round in 0..20usize {
        let size = 4 + (round * 7) % 9;
        let p = ((round * 37) % 101) as u8;
        if maze.generate(RoundConfig::new(size, size + 1, p)).is_err() {
            failures += 1;
        }
    }
    maze.clear_maze();

    let over_peak: Vec<String> = maze
        .pool()
        .all_stats()
        .into_iter()
        .filter(|(_, s)| s.created > s.peak_active)
        .map(|(k, s)| format!("{:?} {}>{}", k, s.created, s.peak_active))
        .collect();
    results.push(TestResult::new(
        "pool",
        "created_bounded_by_peak",
        failures == 0 && over_peak.is_empty(),
        if over_peak.is_empty() {
            format!("{} pieces over 20 rounds", maze.pool().total_created())
        } else {
            over_peak.join(", ")
        },
    ));
    results.push(TestResult::new(
        "pool",
        "clear_releases_all",
        maze.pool().active_count() == 0,
        format!("{} active after clear", maze.pool().active_count()),
    ));

    results
}

// ── 5. Decorations ──────────────────────────────────────────────────────

fn validate_decorations(config: &MazeConfig) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut maze = engine(config, SEED + 5);
    let mut violations = 0;
    let mut placed = 0;
    for round in 0..10u8 {
        match maze.generate(RoundConfig::new(12, 12, round * 10)) {
            Ok(report) => {
                placed += report.decorations.placed;
                if has_errors(&maze.validate()) {
                    violations += 1;
                }
            }
            Err(_) => violations += 1,
        }
    }
    results.push(TestResult::new(
        "decorations",
        "spacing_and_layout_valid",
        violations == 0,
        format!("{} decorations over 10 rounds, {} invalid rounds", placed, violations),
    ));
    results
}

// ── 6. Navigation ───────────────────────────────────────────────────────

fn validate_navigation(config: &MazeConfig) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut maze = engine(config, SEED + 6);
    let generated = maze.generate(RoundConfig::new(8, 8, 50)).is_ok();

    let triangles = maze.navigation().walkable_triangle_count();
    results.push(TestResult::new(
        "navigation",
        "bake_has_walkable_surface",
        generated && triangles > 0,
        format!("{} walkable triangles", triangles),
    ));

    let airborne = (0..500)
        .map(|_| maze.random_point())
        .filter(|p| p.y.abs() > 1e-3)
        .count();
    results.push(TestResult::new(
        "navigation",
        "random_points_on_floor",
        airborne == 0,
        format!("{} of 500 points off the floor", airborne),
    ));

    let far = Vec3::new(-1000.0, 0.0, -1000.0);
    results.push(TestResult::new(
        "navigation",
        "nearest_falls_back_to_input",
        maze.nearest_valid_position(far) == far,
        "unreachable point returned unchanged".into(),
    ));

    let pillar = maze.nearest_pillar_position(Vec3::ZERO);
    results.push(TestResult::new(
        "navigation",
        "corner_pillar",
        pillar.map_or(false, |p| p.x == 0.0 && p.z == 0.0),
        format!("nearest pillar to origin: {:?}", pillar),
    ));

    results
}

// ── 7. Snapshots ────────────────────────────────────────────────────────

fn validate_snapshots(config: &MazeConfig) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut maze = engine(config, SEED + 7);
    if let Err(e) = maze.generate(RoundConfig::new(9, 6, 60)) {
        results.push(TestResult::new("snapshot", "roundtrip", false, e.to_string()));
        return results;
    }

    let Some(snapshot) = MazeSnapshot::capture(&maze) else {
        results.push(TestResult::new("snapshot", "roundtrip", false, "nothing captured".into()));
        return results;
    };

    let mut buf = Vec::new();
    let loaded = save_snapshot(&mut buf, &snapshot).and_then(|_| load_snapshot(buf.as_slice()));
    let restored = loaded.and_then(|s| {
        let mut other = engine(config, SEED + 8);
        s.restore(&mut other).map(|_| other)
    });
    match restored {
        Ok(other) => results.push(TestResult::new(
            "snapshot",
            "roundtrip",
            other.grid() == maze.grid()
                && other.decoration_placements() == maze.decoration_placements(),
            format!("{} bytes", buf.len()),
        )),
        Err(e) => results.push(TestResult::new("snapshot", "roundtrip", false, e.to_string())),
    }
    results
}
