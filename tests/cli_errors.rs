use predicates::str::contains;

#[test]
fn zero_arrival_rate_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args(["solve", "--lambda", "0", "--mu", "1"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: invalid parameter: arrival rate must be > 0 (got 0)"));
}

#[test]
fn negative_service_rate_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args(["solve", "--lambda", "1", "--mu", "-2"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: invalid parameter: service rate must be > 0 (got -2)"));
}

#[test]
fn zero_servers_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args(["solve", "--lambda", "1", "--mu", "2", "--servers", "0"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: invalid parameter: server count must be >= 1"));
}

#[test]
fn overflowing_solve_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args([
        "solve",
        "--lambda",
        "1000000",
        "--mu",
        "1",
        "--max-state",
        "400",
    ]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: numeric overflow"));
}

#[test]
fn unstable_simulation_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args(["simulate", "--lambda", "2", "--mu", "1", "--seed", "1"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: unstable system (rho = 2.0000 >= 1)"));
}

#[test]
fn unstable_monte_carlo_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args([
        "monte-carlo",
        "--lambda",
        "3",
        "--mu",
        "1",
        "--servers",
        "3",
        "--runs",
        "4",
    ]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: unstable system (rho = 1.0000 >= 1)"));
}

#[test]
fn unstable_markov_chain_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args(["markov", "--lambda", "5", "--mu", "1", "--servers", "2"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: unstable system (rho = 2.5000 >= 1)"));
}

#[test]
fn missing_subcommand_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.assert().failure().stderr(contains("Error: "));
}

#[test]
fn oversized_max_state_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args([
        "solve",
        "--lambda",
        "0.5",
        "--mu",
        "1",
        "--max-state",
        "18446744073709551615",
    ]);
    cmd.assert()
        .failure()
        .stderr(contains("is too large to allocate"));
}

#[test]
fn oversized_step_count_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args([
        "markov",
        "--lambda",
        "0.5",
        "--mu",
        "1",
        "--steps",
        "18446744073709551615",
        "--seed",
        "1",
    ]);
    cmd.assert()
        .failure()
        .stderr(contains("steps are too many to record"));
}
