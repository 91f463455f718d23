//! PidController 性能基准测试
//!
//! 单步更新与派生量读取的开销。

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use simple_pid::PidController;
use simple_pid::simulation::{SimulatedProcess, Simulation};

fn setup_controller() -> PidController {
    let mut pid = PidController::new(1.2, 1.0, 0.01, 1.0).unwrap();
    pid.set_target(10.0).unwrap();
    pid
}

fn bench_update(c: &mut Criterion) {
    let mut pid = setup_controller();
    let mut pv = 0.0;

    c.bench_function("pid_update", |b| {
        b.iter(|| {
            let output = pid.update(black_box(pv)).unwrap();
            pv = (pv + output.clamp(-0.1, 0.1)) % 20.0;
            black_box(output);
        });
    });
}

fn bench_terms(c: &mut Criterion) {
    let mut pid = setup_controller();
    pid.update(3.0).unwrap();

    c.bench_function("pid_terms", |b| {
        b.iter(|| {
            black_box(pid.terms());
        });
    });
}

fn bench_simulation_run(c: &mut Criterion) {
    c.bench_function("simulation_run_to_tolerance", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(setup_controller(), SimulatedProcess::new(0.0, 0.1).unwrap(), 0.05);
            black_box(sim.run(500, |_| {}).unwrap());
        });
    });
}

criterion_group!(benches, bench_update, bench_terms, bench_simulation_run);
criterion_main!(benches);
