//! Controller lifecycle behavior under a live background loop.

use cellarium_core::config::{AppConfig, MAX_UPDATE_INTERVAL, MIN_UPDATE_INTERVAL};
use cellarium_sim::{SimEvent, Simulation};
use std::sync::Arc;
use std::time::Duration;

fn small_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.grid.width = 24;
    config.grid.height = 24;
    config.simulation.seed = Some(99);
    config
}

#[test]
fn interval_clamps_at_documented_bounds() {
    let sim = Simulation::new(&small_config());
    assert_eq!(sim.set_update_interval(-5.0), 0.01);
    assert_eq!(sim.set_update_interval(100.0), 2.0);
    assert_eq!(MIN_UPDATE_INTERVAL, 0.01);
    assert_eq!(MAX_UPDATE_INTERVAL, 2.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn double_start_runs_a_single_loop() {
    let sim = Simulation::new(&small_config());
    sim.set_update_interval(MAX_UPDATE_INTERVAL);
    sim.start();
    sim.start();

    tokio::time::sleep(Duration::from_millis(150)).await;
    // Each loop steps once before its first sleep; two loops would show
    // two generations here.
    assert_eq!(sim.get_state().unwrap().generation, 1);
    assert!(sim.is_running());
    sim.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_is_observed_within_its_bounded_wait() {
    let sim = Simulation::new(&small_config());
    sim.randomize(0.4);
    sim.set_update_interval(MIN_UPDATE_INTERVAL);
    sim.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    sim.stop().await;

    let stopped = sim.get_state().unwrap();
    assert!(!stopped.running);
    assert!(stopped.generation > 0);

    // No step starts after stop() has returned.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sim.get_state().unwrap().generation, stopped.generation);
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_and_start_cycle_repeatedly() {
    let sim = Simulation::new(&small_config());
    sim.randomize(0.3);
    sim.set_update_interval(MIN_UPDATE_INTERVAL);

    let mut last_generation = 0;
    for _ in 0..3 {
        sim.start();
        tokio::time::sleep(Duration::from_millis(60)).await;
        sim.stop().await;
        let generation = sim.get_state().unwrap().generation;
        assert!(generation > last_generation);
        last_generation = generation;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reads_never_observe_a_torn_grid() {
    let sim = Arc::new(Simulation::new(&small_config()));
    sim.randomize(0.5);
    sim.set_update_interval(MIN_UPDATE_INTERVAL);
    sim.start();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let sim = Arc::clone(&sim);
            tokio::spawn(async move {
                for _ in 0..40 {
                    let status = sim.get_state().expect("state available");
                    assert_eq!(status.grid.len(), status.height as usize);
                    for row in &status.grid {
                        assert_eq!(row.len(), status.width as usize);
                        assert!(row.iter().all(|c| *c <= 1));
                    }
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            })
        })
        .collect();

    for reader in readers {
        reader.await.unwrap();
    }
    sim.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn generation_events_track_the_loop() {
    let sim = Simulation::new(&small_config());
    let mut rx = sim.hub().subscribe();

    sim.set_update_interval(MIN_UPDATE_INTERVAL);
    sim.start();

    let mut last = 0;
    for _ in 0..5 {
        match rx.recv().await.unwrap() {
            SimEvent::GenerationAdvanced { generation } => {
                assert_eq!(generation, last + 1);
                last = generation;
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
    sim.stop().await;
}
