use std::io::Cursor;

use criterion::{BatchSize, Criterion, Throughput};
use ucmsg::config::Config;
use ucmsg::driver::Driver;
use ucmsg::envelope::Envelope;
use ucmsg::network::application::mqtt::{Client, Options, QoS};
use ucmsg::network::error::Error;
use ucmsg::network::{Close, Connection, Read, Write};

const LINE: &str = r#"{"timestamp":1700000000123,"topic":"state/ap-7","serial":"24:f5:a2:00:11:22","msg":{"radios":[{"channel":36,"band":"5G"}],"uptime":3600}}"#;

/// Accepts CONNECT and discards everything written afterwards.
struct SinkConnection {
    connack: [u8; 4],
    read_pos: usize,
}

impl SinkConnection {
    fn new() -> Self {
        Self {
            connack: [0x20, 0x02, 0x00, 0x00],
            read_pos: 0,
        }
    }
}

impl Read for SinkConnection {
    type Error = Error;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = &self.connack[self.read_pos..];
        let len = buf.len().min(remaining.len());
        buf[..len].copy_from_slice(&remaining[..len]);
        self.read_pos += len;
        Ok(len)
    }
}

impl Write for SinkConnection {
    type Error = Error;
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for SinkConnection {
    type Error = Error;
    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Connection for SinkConnection {}

fn bench_config() -> Config {
    Config {
        host: "localhost".to_string(),
        port: 1883,
        topic: "ucentral".to_string(),
        user: "test".to_string(),
        password: String::new(),
        client_id: "ucentralmqtt-pub-bench".to_string(),
        dry_run: false,
        verbose: false,
    }
}

pub fn bench_encode_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");
    group.throughput(Throughput::Bytes(LINE.len() as u64));
    group.bench_function("from_json_line+encode", |b| {
        b.iter(|| Envelope::from_json_line(LINE).map(|e| e.encode()))
    });
    group.finish();
}

pub fn bench_publish_envelope(c: &mut Criterion) {
    let payload = Envelope::from_json_line(LINE)
        .expect("valid line")
        .encode();
    let (mut client, _ack) =
        Client::connect(SinkConnection::new(), Options::new("bench")).expect("connect");

    let mut group = c.benchmark_group("publish");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("qos0", |b| {
        b.iter(|| {
            client
                .publish("ucentral", &payload, QoS::AtMostOnce, false)
                .expect("publish")
        })
    });
    group.finish();
}

pub fn bench_drain_lines(c: &mut Criterion) {
    let config = bench_config();
    let input: String = std::iter::repeat(LINE).take(1000).collect::<Vec<_>>().join("\n");

    let mut group = c.benchmark_group("driver");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("drain_1000_lines", |b| {
        b.iter_batched(
            || {
                let (client, _ack) = Client::connect(SinkConnection::new(), config.mqtt_options())
                    .expect("connect");
                (client, Cursor::new(input.clone().into_bytes()))
            },
            |(mut client, lines)| {
                Driver::new(&config, std::io::sink())
                    .run(lines, Some(&mut client))
                    .expect("drain")
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}
