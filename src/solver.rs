use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::QueueModel;
use crate::state::SteadyState;

/// Solves the birth-death chain with arrival rate `lambda` and service rate
/// `min(n, servers) * mu`, truncated at `max_state`.
///
/// An unstable system (`rho >= 1`) is still solved; the returned `rho` lets
/// the caller flag the result. Non-finite probabilities or derived metrics
/// are rejected as [`Error::NumericOverflow`].
pub fn solve(lambda: f64, mu: f64, servers: u32, max_state: usize) -> Result<SteadyState> {
    let model = QueueModel::new(lambda, mu, servers);
    model.validate()?;
    if max_state < servers as usize {
        return Err(Error::InvalidParameter(format!(
            "max state must be >= server count ({} < {})",
            max_state, servers
        )));
    }

    let rho = model.rho();
    if rho >= 1.0 {
        warn!(rho, "steady-state metrics requested for an unstable system");
    }

    let coefficients = product_form_coefficients(lambda, mu, servers, max_state)?;
    let tail: f64 = coefficients[1..].iter().sum();
    if !tail.is_finite() {
        return Err(Error::NumericOverflow(format!(
            "normalization constant diverges at max state {}",
            max_state
        )));
    }
    let p0 = 1.0 / (1.0 + tail);
    let p: Vec<f64> = coefficients.iter().map(|c| c * p0).collect();
    if let Some(n) = p.iter().position(|value| !value.is_finite()) {
        return Err(Error::NumericOverflow(format!("P({}) is not finite", n)));
    }

    let c = servers as usize;
    let l = p
        .iter()
        .enumerate()
        .map(|(n, pn)| n as f64 * pn)
        .sum::<f64>();
    let lq = p
        .iter()
        .enumerate()
        .skip(c)
        .map(|(n, pn)| (n - c) as f64 * pn)
        .sum::<f64>();
    let w = l / lambda;
    let wq = lq / lambda;

    for (name, value) in [("L", l), ("Lq", lq), ("W", w), ("Wq", wq)] {
        if !value.is_finite() {
            return Err(Error::NumericOverflow(format!("{} is not finite", name)));
        }
    }

    debug!(lambda, mu, servers, max_state, rho, l, lq, "solved steady state");

    Ok(SteadyState {
        lambda,
        mu,
        servers,
        rho,
        p,
        l,
        lq,
        w,
        wq,
    })
}

fn product_form_coefficients(
    lambda: f64,
    mu: f64,
    servers: u32,
    max_state: usize,
) -> Result<Vec<f64>> {
    let len = max_state.checked_add(1).ok_or_else(|| too_many_states(max_state))?;
    let mut coefficients: Vec<f64> = Vec::new();
    coefficients
        .try_reserve_exact(len)
        .map_err(|_| too_many_states(max_state))?;
    coefficients.push(1.0);
    for n in 1..=max_state {
        let service_rate = n.min(servers as usize) as f64 * mu;
        let previous = coefficients[n - 1];
        coefficients.push(previous * lambda / service_rate);
    }
    Ok(coefficients)
}

fn too_many_states(max_state: usize) -> Error {
    Error::InvalidParameter(format!(
        "max state {} is too large to allocate",
        max_state
    ))
}
