use std::fmt::Write;

use crate::cases::CaseReport;
use crate::state::{FlowPoint, QueueMetrics, Report, RunMetadata, SteadyState};

pub trait Formatter {
    fn write(&self, report: &Report) -> String;
}

pub struct HumanFormatter;
pub struct SummaryFormatter;
pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn write(&self, report: &Report) -> String {
        render(report, true)
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, report: &Report) -> String {
        render(report, false)
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, report: &Report) -> String {
        match serde_json::to_string_pretty(report) {
            Ok(json) => format!("{}\n", json),
            Err(err) => format!("{{\"error\": \"{}\"}}\n", err),
        }
    }
}

fn render(report: &Report, detailed: bool) -> String {
    let mut out = String::new();
    match report {
        Report::Steady { metadata, steady } => {
            write_metadata(&mut out, metadata);
            write_steady(&mut out, steady);
            if detailed {
                write_probabilities(&mut out, &steady.p);
            }
        }
        Report::Empirical {
            arrival_queue,
            service_queue,
            metrics,
        } => {
            let _ = writeln!(out, "Metadata:");
            let _ = writeln!(out, "analysis: extract");
            let _ = writeln!(out, "arrival_queue: {}", arrival_queue);
            let _ = writeln!(out, "service_queue: {}", service_queue);
            let _ = writeln!(out, "servers: {}", metrics.servers);
            write_empirical(&mut out, metrics);
            if detailed {
                write_elements(&mut out, metrics);
                write_flow(&mut out, &metrics.flow);
                write_probabilities(&mut out, &metrics.p);
            }
        }
        Report::Trace {
            metadata,
            statistics,
            trace,
        } => {
            write_metadata(&mut out, metadata);
            if detailed {
                let _ = writeln!(out, "Trace:");
                for point in trace {
                    let _ = writeln!(out, "t={:.4} n={}", point.time, point.queue_length);
                }
            }
            let _ = writeln!(out, "Summary:");
            let _ = writeln!(out, "events: {}", trace.len());
            let _ = writeln!(out, "customers served: {}", statistics.customers);
            let _ = writeln!(out, "avg queue length: {:.4}", statistics.avg_queue_length);
            let _ = writeln!(out, "avg utilization: {:.4}", statistics.avg_utilization);
            let _ = writeln!(out, "avg waiting time: {:.4}", statistics.avg_waiting_time);
        }
        Report::MonteCarlo { metadata, summary } => {
            write_metadata(&mut out, metadata);
            let _ = writeln!(out, "Summary:");
            let _ = writeln!(out, "runs: {}", summary.runs);
            let _ = writeln!(out, "avg queue length: {:.4}", summary.avg_queue_length);
            let _ = writeln!(out, "avg utilization: {:.4}", summary.avg_utilization);
            let _ = writeln!(out, "avg waiting time: {:.4}", summary.avg_waiting_time);
        }
        Report::Markov { metadata, steps } => {
            write_metadata(&mut out, metadata);
            if detailed {
                let _ = writeln!(out, "Steps:");
                for step in steps {
                    let _ = writeln!(out, "{}: {}", step.step, step.state);
                }
            }
            let final_state = steps.last().map(|step| step.state).unwrap_or(0);
            let peak = steps.iter().map(|step| step.state).max().unwrap_or(0);
            let _ = writeln!(out, "Summary:");
            let _ = writeln!(out, "steps: {}", steps.len().saturating_sub(1));
            let _ = writeln!(out, "final state: {}", final_state);
            let _ = writeln!(out, "peak state: {}", peak);
        }
        Report::Cases { cases } => {
            for case in cases {
                write_case(&mut out, case, detailed);
            }
        }
    }
    out
}

fn write_metadata(out: &mut String, metadata: &RunMetadata) {
    let _ = writeln!(out, "Metadata:");
    let _ = writeln!(out, "analysis: {}", metadata.analysis);
    let _ = writeln!(out, "lambda: {}", metadata.lambda);
    let _ = writeln!(out, "mu: {}", metadata.mu);
    let _ = writeln!(out, "servers: {}", metadata.servers);
    if let Some(seed) = metadata.seed {
        let _ = writeln!(out, "seed: {}", seed);
    }
}

fn write_steady(out: &mut String, steady: &SteadyState) {
    let _ = writeln!(out, "Steady state:");
    let _ = writeln!(out, "rho: {:.4}{}", steady.rho, stability_note(steady.rho));
    let _ = writeln!(out, "L: {:.4}", steady.l);
    let _ = writeln!(out, "Lq: {:.4}", steady.lq);
    let _ = writeln!(out, "W: {:.4}", steady.w);
    let _ = writeln!(out, "Wq: {:.4}", steady.wq);
}

fn write_empirical(out: &mut String, metrics: &QueueMetrics) {
    let _ = writeln!(out, "Measured:");
    let _ = writeln!(out, "lambda: {:.4}", metrics.lambda);
    let _ = writeln!(out, "mu: {:.4}", metrics.mu);
    let _ = writeln!(out, "rho: {:.4}{}", metrics.rho, stability_note(metrics.rho));
    let _ = writeln!(out, "avg service time: {:.4}", metrics.avg_service_time);
    let _ = writeln!(out, "idle time: {:.4}", metrics.idle_time);
    let _ = writeln!(out, "idle proportion: {:.4}", metrics.idle_proportion);
    let _ = writeln!(out, "Steady state:");
    let _ = writeln!(out, "L: {:.4}", metrics.l);
    let _ = writeln!(out, "Lq: {:.4}", metrics.lq);
    let _ = writeln!(out, "W: {:.4}", metrics.w);
    let _ = writeln!(out, "Wq: {:.4}", metrics.wq);
}

fn write_elements(out: &mut String, metrics: &QueueMetrics) {
    let _ = writeln!(out, "Clients:");
    for (idx, timestamp) in metrics.timestamps.iter().enumerate() {
        let wait = metrics.waiting_times.get(idx).copied().unwrap_or(0.0);
        let idle = metrics.idle_times.get(idx).copied().unwrap_or(0.0);
        let _ = writeln!(
            out,
            "{} arrived {} (wait: {:.3}s, idle before: {:.3}s)",
            idx + 1,
            timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            wait,
            idle
        );
    }
}

fn write_flow(out: &mut String, flow: &[FlowPoint]) {
    let _ = writeln!(out, "Flow:");
    for point in flow {
        let _ = writeln!(
            out,
            "t={:.3} arrivals={} departures={}",
            point.time, point.arrivals, point.departures
        );
    }
}

fn write_probabilities(out: &mut String, p: &[f64]) {
    let _ = writeln!(out, "Probabilities:");
    for (n, pn) in p.iter().enumerate() {
        let _ = writeln!(out, "P({}) = {:.6}", n, pn);
    }
}

fn write_case(out: &mut String, case: &CaseReport, detailed: bool) {
    let steady = &case.steady;
    let _ = writeln!(
        out,
        "{}: lambda={} mu={} c={} rho={:.4} L={:.4} Lq={:.4} W={:.4} Wq={:.4}",
        case.name,
        steady.lambda,
        steady.mu,
        steady.servers,
        steady.rho,
        steady.l,
        steady.lq,
        steady.w,
        steady.wq
    );
    if detailed {
        let _ = writeln!(out, "  {}", case.description);
    }
}

fn stability_note(rho: f64) -> &'static str {
    if rho >= 1.0 {
        " (unstable: steady-state values are diagnostic only)"
    } else {
        ""
    }
}
