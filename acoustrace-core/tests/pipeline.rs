use acoustrace_core::scene::{NUM_BANDS, shoebox};
use acoustrace_core::*;
use approx::assert_relative_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_config() -> SimulationConfig {
    SimulationConfig::new()
        .max_reflection_order(2)
        .sample_rate(8_000)
        .impulse_response_duration(0.5)
}

fn test_signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (i as f32 * 0.031).sin() * (i as f32 * 0.0007).cos())
        .collect()
}

#[test]
fn test_direct_path_in_empty_scene() {
    init_logger();
    let catalog = MaterialCatalog::with_presets();
    let simulator = Simulator::new(&[], &catalog, SimulationConfig::default()).unwrap();

    let paths = simulator.trace_paths(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].order(), 0);
    assert_relative_eq!(paths[0].length(), 5.0, epsilon = 1e-6);
}

#[test]
fn test_occluded_direct_path() {
    init_logger();
    let catalog = MaterialCatalog::with_presets();
    let wall = [Triangle::new(
        Vec3::new(1.5, -20.0, -20.0),
        Vec3::new(1.5, 40.0, -20.0),
        Vec3::new(1.5, -20.0, 40.0),
        "concrete",
    )];
    let simulator = Simulator::new(&wall, &catalog, test_config()).unwrap();

    let paths = simulator.trace_paths(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
    assert_eq!(paths.iter().filter(|p| p.order() == 0).count(), 0);

    // A fully blocked receiver hears nothing but still gets a full-length output
    let output = simulator
        .simulate(Vec3::ZERO, &test_signal(100), Vec3::new(3.0, 4.0, 0.0))
        .unwrap();
    assert_eq!(output.len(), 100 + 4_000 - 1);
    assert!(output.iter().all(|&s| s == 0.0));
}

#[test]
fn test_output_is_normalized() {
    init_logger();
    let catalog = MaterialCatalog::with_presets();
    let room = shoebox(Vec3::ZERO, Vec3::new(10.0, 8.0, 6.0), "brick");
    let config = test_config().normalization_peak(0.5);
    let simulator = Simulator::new(&room, &catalog, config).unwrap();

    let output = simulator
        .simulate(Vec3::new(2.3, 3.1, 1.7), &test_signal(2_000), Vec3::new(6.9, 5.3, 2.45))
        .unwrap();

    assert_eq!(output.len(), 2_000 + 4_000 - 1);
    let peak = output.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert_relative_eq!(peak, 0.5, epsilon = 1e-5);
}

#[test]
fn test_silent_input_stays_silent() {
    init_logger();
    let catalog = MaterialCatalog::with_presets();
    let room = shoebox(Vec3::ZERO, Vec3::new(10.0, 8.0, 6.0), "concrete");
    let simulator = Simulator::new(&room, &catalog, test_config()).unwrap();

    let output = simulator
        .simulate(Vec3::new(2.3, 3.1, 1.7), &vec![0.0; 500], Vec3::new(6.9, 5.3, 2.45))
        .unwrap();
    assert!(output.iter().all(|s| *s == 0.0));
}

#[test]
fn test_unknown_material_uses_default() {
    init_logger();
    let catalog = MaterialCatalog::with_presets();
    let known = shoebox(Vec3::ZERO, Vec3::new(10.0, 8.0, 6.0), "concrete");
    let unknown = shoebox(Vec3::ZERO, Vec3::new(10.0, 8.0, 6.0), "unobtainium");
    let source = Vec3::new(2.3, 3.1, 1.7);
    let receiver = Vec3::new(6.9, 5.3, 2.45);

    let expected = Simulator::new(&known, &catalog, test_config())
        .unwrap()
        .trace_paths(source, receiver);
    let fallback = Simulator::new(&unknown, &catalog, test_config())
        .unwrap()
        .trace_paths(source, receiver);

    assert_eq!(expected.len(), fallback.len());
    for (a, b) in expected.iter().zip(&fallback) {
        for band in 0..NUM_BANDS {
            assert_eq!(a.attenuation()[band], b.attenuation()[band]);
        }
    }
}

#[test]
fn test_simulate_is_idempotent() {
    init_logger();
    let catalog = MaterialCatalog::with_presets();
    let room = shoebox(Vec3::ZERO, Vec3::new(6.0, 5.0, 3.0), "plaster");
    let simulator = Simulator::new(&room, &catalog, test_config()).unwrap();
    let signal = test_signal(1_500);

    let first = simulator
        .simulate(Vec3::new(1.2, 1.4, 1.1), &signal, Vec3::new(4.1, 3.3, 1.6))
        .unwrap();
    let second = simulator
        .simulate(Vec3::new(1.2, 1.4, 1.1), &signal, Vec3::new(4.1, 3.3, 1.6))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_simulations_share_scene() {
    init_logger();
    let catalog = MaterialCatalog::with_presets();
    let room = shoebox(Vec3::ZERO, Vec3::new(6.0, 5.0, 3.0), "oak");
    let simulator = Simulator::new(&room, &catalog, test_config()).unwrap();
    let signal = test_signal(800);
    let receivers = [
        Vec3::new(4.1, 3.3, 1.6),
        Vec3::new(2.0, 4.0, 2.0),
        Vec3::new(5.0, 1.0, 0.5),
    ];

    let sequential: Vec<Vec<f32>> = receivers
        .iter()
        .map(|&r| simulator.simulate(Vec3::new(1.2, 1.4, 1.1), &signal, r).unwrap())
        .collect();

    let parallel: Vec<Vec<f32>> = std::thread::scope(|scope| {
        let handles: Vec<_> = receivers
            .iter()
            .map(|&r| {
                let simulator = &simulator;
                let signal = &signal;
                scope.spawn(move || simulator.simulate(Vec3::new(1.2, 1.4, 1.1), signal, r))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn test_custom_catalog_and_medium() {
    init_logger();
    let catalog = MaterialCatalog::new("glass", MaterialProperties::glass())
        .with_material("steel", MaterialProperties::steel());
    let floor = [Triangle::new(
        Vec3::new(-50.0, -50.0, 0.0),
        Vec3::new(50.0, -50.0, 0.0),
        Vec3::new(0.0, 50.0, 0.0),
        "Steel",
    )];
    let config = test_config()
        .max_reflection_order(1)
        .with_medium(Medium::WATER);
    let simulator = Simulator::new(&floor, &catalog, config).unwrap();

    let (ir, paths) = simulator.room_response(Vec3::new(0.0, 0.0, 1.0), Vec3::new(4.0, 0.0, 2.0));
    assert_eq!(paths.len(), 2);

    // 5 m reflected path through water
    let reflected = paths.iter().find(|p| p.order() == 1).unwrap();
    assert_relative_eq!(reflected.length(), 5.0, epsilon = 1e-5);
    assert_relative_eq!(
        reflected.delay(simulator.config().speed_of_sound),
        5.0 / 1482.0,
        epsilon = 1e-6
    );
    assert!(!ir.is_silent());
}

#[test]
fn test_world_renders_every_microphone() -> anyhow::Result<()> {
    init_logger();
    let catalog = MaterialCatalog::with_presets();
    let room = shoebox(Vec3::ZERO, Vec3::new(6.0, 5.0, 3.0), "concrete");
    let config = test_config().max_reflection_order(1);

    let mut world = World::new(&room, &catalog, config)?;
    world.add_source(SourceConfig::at(Vec3::new(1.0, 1.0, 1.0)), test_signal(300))?;
    world.add_source(
        SourceConfig::at(Vec3::new(5.0, 4.0, 2.0)).with_volume(0.5),
        test_signal(600),
    )?;
    let omni = world.add_microphone(MicrophoneConfig::omni(Vec3::new(3.0, 2.5, 1.5)));
    let cardioid = world.add_microphone(
        MicrophoneConfig::omni(Vec3::new(2.0, 2.0, 1.0))
            .with_directivity(Directivity::cardioid(Vec3::Y))
            .with_name("Front"),
    );

    let outputs = world.render()?;
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].0, omni);
    assert_eq!(outputs[1].0, cardioid);
    for (_, samples) in &outputs {
        assert_eq!(samples.len(), world.output_len());
        assert_eq!(samples.len(), 600 + 4_000 - 1);
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert_relative_eq!(peak, 0.9, epsilon = 1e-5);
    }
    Ok(())
}
