use predicates::str::{contains, diff};

#[test]
fn summary_mm1_matches_textbook_values() {
    let expected = concat!(
        "Metadata:\n",
        "analysis: solve\n",
        "lambda: 0.5\n",
        "mu: 1\n",
        "servers: 1\n",
        "Steady state:\n",
        "rho: 0.5000\n",
        "L: 1.0000\n",
        "Lq: 0.5000\n",
        "W: 2.0000\n",
        "Wq: 1.0000\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args([
        "solve",
        "--lambda",
        "0.5",
        "--mu",
        "1",
        "--servers",
        "1",
        "--format",
        "summary",
    ]);
    cmd.assert().success().stdout(diff(expected));
}

#[test]
fn human_output_lists_truncated_probabilities() {
    let expected = concat!(
        "Metadata:\n",
        "analysis: solve\n",
        "lambda: 0.5\n",
        "mu: 1\n",
        "servers: 1\n",
        "Steady state:\n",
        "rho: 0.5000\n",
        "L: 0.7333\n",
        "Lq: 0.2667\n",
        "W: 1.4667\n",
        "Wq: 0.5333\n",
        "Probabilities:\n",
        "P(0) = 0.533333\n",
        "P(1) = 0.266667\n",
        "P(2) = 0.133333\n",
        "P(3) = 0.066667\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args(["solve", "--lambda", "0.5", "--mu", "1", "--max-state", "3"]);
    cmd.assert().success().stdout(diff(expected));
}

#[test]
fn unstable_system_is_solved_but_flagged() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args([
        "solve",
        "--lambda",
        "1.5",
        "--mu",
        "1",
        "--max-state",
        "10",
        "--format",
        "summary",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("rho: 1.5000 (unstable: steady-state values are diagnostic only)\n"));
}

#[test]
fn json_output_carries_probability_vector() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args([
        "solve",
        "--lambda",
        "0.8",
        "--mu",
        "0.5",
        "--servers",
        "2",
        "--max-state",
        "400",
        "--format",
        "json",
    ]);
    let output = cmd.output().expect("command should run");
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["report"], "steady");
    assert_eq!(json["metadata"]["servers"], 2);
    let p0 = json["steady"]["p"][0].as_f64().expect("P(0) should be a number");
    assert!((p0 - 1.0 / 9.0).abs() < 1e-9);
    let lq = json["steady"]["lq"].as_f64().expect("Lq should be a number");
    assert!((lq - 2.844_444).abs() < 1e-5);
}

#[test]
fn cases_list_every_built_in_system() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("queue-lab");
    cmd.args(["cases", "--format", "summary"]);
    cmd.assert()
        .success()
        .stdout(contains("stable-mm1: lambda=0.5 mu=1 c=1 rho=0.5000"))
        .stdout(contains("stable-mm2: lambda=0.8 mu=0.5 c=2 rho=0.8000"))
        .stdout(contains("efficient-mm3: lambda=1.2 mu=0.5 c=3 rho=0.8000"));
}
