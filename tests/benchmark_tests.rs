//! Performance benchmarks for the simulation and the snapshot path

use shared::geometry::Vector2;
use shared::sim;
use shared::state::GameState;
use shared::{Side, MAX_ENEMIES, MAX_TOWERS};
use std::time::Instant;

/// A board with every tower slot used and enemies on both lanes.
fn busy_state() -> GameState {
    let mut state = GameState::new();
    for side in Side::BOTH {
        state.economy_mut(side).set_balance(1_000_000);
    }
    for i in 0..MAX_TOWERS {
        let (x, owner) = if i % 2 == 0 {
            (100 + (i as i32) * 25, 0)
        } else {
            (900 + (i as i32) * 25, 1)
        };
        assert!(state.place_tower(i % 3, x, 150 + (i as i32 % 5) * 120, owner));
    }
    state.in_wave_delay = false;
    state.current_wave = 3;
    while state.enemies.len() + 2 <= MAX_ENEMIES {
        if sim::spawn_enemy_pair(&mut state) == sim::SpawnOutcome::WaveDelay {
            state.in_wave_delay = false;
        }
    }
    state
}

/// Benchmarks a full simulation step on a crowded board
#[test]
fn benchmark_simulation_step() {
    let mut state = busy_state();
    let iterations = 2_000;
    let start = Instant::now();

    for _ in 0..iterations {
        sim::step(&mut state, 1.0 / 60.0);
    }

    let duration = start.elapsed();
    println!(
        "Simulation step: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Under 5 seconds even in a debug build
    assert!(duration.as_secs_f64() < 5.0);
}

/// Benchmarks target selection against a full enemy pool
#[test]
fn benchmark_target_selection() {
    let state = busy_state();
    let iterations = 10_000;
    let start = Instant::now();

    let mut found = 0;
    for _ in 0..iterations {
        for tower in state.towers.iter() {
            if sim::find_target(tower, state.enemies.as_slice()).is_some() {
                found += 1;
            }
        }
    }

    let duration = start.elapsed();
    println!(
        "Target selection: {} passes in {:?} ({} hits)",
        iterations, duration, found
    );

    assert!(duration.as_secs_f64() < 5.0);
}

/// Benchmarks capturing, encoding and decoding one snapshot per client
#[test]
fn benchmark_snapshot_pipeline() {
    use shared::protocol::{decode_server_packet, encode_server_packet, ServerCommand, ServerPacket};
    use shared::snapshot::GameSnapshot;

    let state = busy_state();
    let iterations = 1_000;
    let start = Instant::now();

    for i in 0..iterations {
        let snapshot = GameSnapshot::capture(&state, (i % 4) as i32);
        let packet = ServerPacket::new(ServerCommand::StateUpdate).with_snapshot(snapshot);
        let bytes = encode_server_packet(&packet).unwrap();
        let decoded = decode_server_packet(&bytes).unwrap();
        assert!(decoded.snapshot.is_some());
    }

    let duration = start.elapsed();
    println!(
        "Snapshot pipeline: {} packets in {:?} ({:.2} μs/packet)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_secs_f64() < 5.0);
}

/// Benchmarks applying snapshots to a client mirror
#[test]
fn benchmark_snapshot_apply() {
    use client::game::ClientGameState;
    use shared::snapshot::GameSnapshot;

    let state = busy_state();
    let snapshot = GameSnapshot::capture(&state, 0);
    let mut mirror = ClientGameState::new();

    let iterations = 5_000;
    let start = Instant::now();

    for _ in 0..iterations {
        mirror.apply_server_state(&snapshot, 0);
    }

    let duration = start.elapsed();
    println!(
        "Snapshot apply: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(mirror.state().towers.len(), MAX_TOWERS);
    assert!(duration.as_secs_f64() < 5.0);
}

/// Benchmarks vector math used by movement and aiming
#[test]
fn benchmark_vector_math() {
    let iterations = 1_000_000;
    let start = Instant::now();

    let mut acc = Vector2::new(0.0, 0.0);
    for i in 0..iterations {
        let a = Vector2::new(i as f32, 3.0);
        let b = Vector2::new(10.0, i as f32 * 0.5);
        acc = acc.add(&a.sub(&b).scale(0.001));
        let _ = a.distance_squared_to(&b);
    }

    let duration = start.elapsed();
    println!(
        "Vector math: {} iterations in {:?} (acc {:?})",
        iterations, duration, acc
    );

    assert!(duration.as_secs_f64() < 5.0);
}
