//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Benchmarks for shell line assembly and output buffering

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use telshell_service::{LineBuffer, SendBuffer};

fn bench_line_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_assembly");
    let input: Vec<u8> = b"ls -la /var/log\r\n".repeat(64);
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("feed_lines", |b| {
        let mut line = LineBuffer::new(80);
        b.iter(|| {
            let mut completed = 0;
            for byte in &input {
                if line.feed(black_box(*byte)).is_some() {
                    completed += 1;
                }
            }
            black_box(completed)
        })
    });

    group.finish();
}

fn bench_send_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("send_buffer");

    group.bench_function("append_until_flush", |b| {
        let mut send = SendBuffer::new(512, 80);
        b.iter(|| {
            while !send.needs_flush() {
                send.append(black_box(b"drwxr-xr-x 2 root root 4096 log\n"));
            }
            send.clear();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_line_assembly, bench_send_buffer);
criterion_main!(benches);
