use criterion::{black_box, criterion_group, criterion_main, Criterion};
use maxctrl_exporter::encoding::text::encode;
use maxctrl_exporter::registry::{Registry, Sample, Subject};

/// A snapshot of a large deployment: 100 servers, 50 services and 32 workers.
fn snapshot(registry: &Registry) -> Vec<Sample> {
    let servers = registry.catalog(Subject::Server);
    let services = registry.catalog(Subject::Service);
    let threads = registry.catalog(Subject::ThreadStatus);

    let mut samples = Vec::new();
    for i in 0..100 {
        let server = format!("server-{i}");
        let address = format!("10.0.{}.{}", i / 256, i % 256);
        samples.push(
            servers
                .sample("server_connections", i, &[server.as_str(), address.as_str()])
                .unwrap(),
        );
        samples.push(
            servers
                .sample("server_up", 1, &[server.as_str(), address.as_str(), ",Slave,Running,"])
                .unwrap(),
        );
    }

    for i in 0..50 {
        let service = format!("service-{i}");
        for key in ["service_current_sessions", "service_sessions_total"] {
            samples.push(
                services
                    .sample(key, f64::from(i) * 1.5, &[service.as_str(), "readwritesplit"])
                    .unwrap(),
            );
        }
    }

    let keys: Vec<&str> = threads
        .descriptors()
        .map(|d| d.name().trim_start_matches("maxctrl_"))
        .collect();
    for worker in 0..32 {
        let id = worker.to_string();
        for key in &keys {
            samples.push(threads.sample(key, 12345.678, &[id.as_str()]).unwrap());
        }
    }

    samples
}

pub fn text(c: &mut Criterion) {
    let registry = Registry::default();
    let samples = snapshot(&registry);

    c.bench_function("encode", |b| {
        let mut buffer = String::new();
        b.iter(|| {
            buffer.clear();
            encode(&mut buffer, black_box(&samples)).unwrap();
            black_box(&buffer);
        });
    });
}

criterion_group!(benches, text);
criterion_main!(benches);
