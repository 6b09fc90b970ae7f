//! select-over-poll translation cost

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use shim_abi::{PollEvents, Timeval};
use shim_mock::MockKernel;
use shim_posix::{FdSet, Runtime};

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    let zero = Timeval::new(0, 0);

    for &nfds in &[16i32, 256, 1024] {
        let mut kernel = MockKernel::new();
        for fd in (0..nfds).step_by(2) {
            kernel.set_ready(fd, PollEvents::POLLIN);
        }
        let mut rt = Runtime::new(kernel);

        let mut interest = FdSet::new();
        for fd in 0..nfds {
            interest.set(fd);
        }

        group.bench_with_input(BenchmarkId::from_parameter(nfds), &nfds, |b, &nfds| {
            b.iter(|| {
                let mut read = interest;
                let n = rt.select(black_box(nfds), Some(&mut read), None, None, Some(&zero));
                rt.kernel_mut().clear_history();
                black_box((n, read))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select);
criterion_main!(benches);
