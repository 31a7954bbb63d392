use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use litefs::bridge::ErrorBody;
use litefs::{Bridge, Config, HostConstants, Request, Response};
use serde_json::{json, Value};
use tempfile::TempDir;

fn bridge(temp_dir: &Path) -> Bridge {
    let constants = HostConstants {
        home: temp_dir.to_path_buf(),
        temp: temp_dir.join("tmp"),
        uuid: "00000000-0000-0000-0000-000000000000".to_string(),
        model: "test-model".to_string(),
    };
    Bridge::new(&Config::default(), constants)
}

fn call(bridge: &Bridge, request: Value) -> Response {
    bridge.dispatch(serde_json::from_value::<Request>(request).expect("valid request"))
}

fn ok(response: Response) -> Value {
    match response {
        Response::Ok(value) => value,
        Response::Error(err) => panic!("unexpected error response: {err:?}"),
    }
}

fn err_kind(response: Response) -> String {
    match response {
        Response::Error(ErrorBody { kind, .. }) => kind,
        Response::Ok(value) => panic!("unexpected ok response: {value}"),
    }
}

#[test]
fn descriptor_scenario_through_dispatch() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bridge = bridge(temp_dir.path());
    let path = temp_dir.path().join("t.bin");

    let fd = ok(call(&bridge, json!({"call": "open", "path": path})));
    assert!(fd.is_u64());
    assert_eq!(
        ok(call(&bridge, json!({"call": "write", "fd": fd, "hex": "48656c6c6f"}))),
        json!(5)
    );
    assert_eq!(ok(call(&bridge, json!({"call": "seek", "fd": fd, "offset": 0}))), json!(0));
    assert_eq!(
        ok(call(&bridge, json!({"call": "read", "fd": fd, "max_length": 5}))),
        json!("48656c6c6f")
    );
    assert_eq!(ok(call(&bridge, json!({"call": "tell", "fd": fd}))), json!(5));
    assert_eq!(
        ok(call(&bridge, json!({"call": "truncate", "fd": fd, "length": 2}))),
        json!(2)
    );
    assert_eq!(ok(call(&bridge, json!({"call": "close", "fd": fd}))), Value::Null);
    assert_eq!(
        err_kind(call(&bridge, json!({"call": "read", "fd": fd, "max_length": 5}))),
        "handle_not_found"
    );

    let stat = ok(call(&bridge, json!({"call": "stat", "path": path})));
    assert_eq!(stat["flag"], json!(2));
    assert_eq!(stat["length"], json!(2));
}

#[test]
fn path_calls_through_dispatch() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bridge = bridge(temp_dir.path());
    let dir = temp_dir.path().join("d");
    let file = dir.join("f");

    assert_eq!(ok(call(&bridge, json!({"call": "exists", "path": dir}))), json!(0));
    assert_eq!(ok(call(&bridge, json!({"call": "mkdir", "path": dir}))), json!(true));
    assert_eq!(ok(call(&bridge, json!({"call": "exists", "path": dir}))), json!(1));
    assert_eq!(ok(call(&bridge, json!({"call": "touch", "path": file}))), json!(true));
    assert_eq!(ok(call(&bridge, json!({"call": "exists", "path": file}))), json!(2));
    assert_eq!(
        ok(call(&bridge, json!({"call": "readdir", "path": dir}))),
        json!([file])
    );

    let copied = dir.join("g");
    assert_eq!(
        ok(call(&bridge, json!({"call": "copy", "src": file, "dst": copied}))),
        json!(true)
    );
    assert_eq!(
        err_kind(call(&bridge, json!({"call": "move", "src": file, "dst": copied}))),
        "already_exists"
    );
    let moved = dir.join("h");
    assert_eq!(
        ok(call(&bridge, json!({"call": "move", "src": file, "dst": moved}))),
        json!(true)
    );
    assert_eq!(
        ok(call(&bridge, json!({"call": "mkdir", "path": dir.join("x/y"), "parents": true}))),
        json!(true)
    );
    let deep = dir.join("p/q/r");
    assert_eq!(
        err_kind(call(&bridge, json!({"call": "touch", "path": deep}))),
        "not_found"
    );
    assert_eq!(
        ok(call(&bridge, json!({"call": "touch", "path": deep, "parents": true}))),
        json!(true)
    );
    assert_eq!(ok(call(&bridge, json!({"call": "exists", "path": deep}))), json!(2));
    assert_eq!(ok(call(&bridge, json!({"call": "remove", "path": dir}))), Value::Null);
    assert_eq!(ok(call(&bridge, json!({"call": "exists", "path": dir}))), json!(0));
}

#[test]
fn constants_use_uppercase_keys() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bridge = bridge(temp_dir.path());
    let constants = ok(call(&bridge, json!({"call": "constants"})));
    assert_eq!(constants["MODEL"], json!("test-model"));
    assert_eq!(constants["HOME"], json!(temp_dir.path()));
    assert!(constants.get("TEMP").is_some());
    assert!(constants.get("UUID").is_some());
}

#[test]
fn serve_answers_each_line_and_closes_leftovers() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bridge = bridge(temp_dir.path());
    let path = temp_dir.path().join("served.bin");

    let input = format!(
        "{}\n\nnot json\n{}\n",
        json!({"call": "open", "path": path}),
        json!({"call": "write", "fd": 1, "hex": "0a0b"}),
    );
    let mut output = Vec::new();
    let handled = bridge.serve(input.as_bytes(), &mut output).unwrap();
    assert_eq!(handled, 3);

    let responses: Vec<Response> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses[0], Response::Ok(json!(1)));
    assert_eq!(err_kind(responses[1].clone()), "invalid_request");
    assert_eq!(responses[2], Response::Ok(json!(2)));

    assert_eq!(bridge.access().open_count(), 0);
    assert_eq!(fs::read(&path).unwrap(), vec![0x0a, 0x0b]);
}

/// Drive the built binary over stdin/stdout the way a host process would.
#[test]
fn binary_serves_requests_over_a_pipe() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.json");
    let config = json!({
        "home_dir": temp_dir.path(),
        "temp_dir": temp_dir.path().join("tmp"),
        "device_id_path": temp_dir.path().join("device_id.json"),
        "model": "pipe-model",
    });
    fs::write(&config_path, config.to_string()).unwrap();
    let data_path = temp_dir.path().join("t.bin");

    let mut child = Command::new(env!("CARGO_BIN_EXE_litefs"))
        .arg("--config")
        .arg(&config_path)
        .arg("serve")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to run litefs serve");

    {
        let mut stdin = child.stdin.take().expect("stdin");
        for request in [
            json!({"call": "open", "path": data_path}),
            json!({"call": "write", "fd": 1, "hex": "48656c6c6f"}),
            json!({"call": "seek", "fd": 1, "offset": 0}),
            json!({"call": "read", "fd": 1, "max_length": 5}),
            json!({"call": "close", "fd": 1}),
            json!({"call": "read", "fd": 1, "max_length": 5}),
            json!({"call": "constants"}),
        ] {
            writeln!(stdin, "{request}").unwrap();
        }
    }

    let output = child.wait_with_output().expect("Failed to wait on litefs");
    assert!(output.status.success());
    let responses: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(responses.len(), 7);
    assert_eq!(responses[1], json!({"ok": 5}));
    assert_eq!(responses[3], json!({"ok": "48656c6c6f"}));
    assert_eq!(responses[4], json!({"ok": null}));
    assert_eq!(responses[5]["error"]["kind"], json!("handle_not_found"));
    assert_eq!(responses[6]["ok"]["MODEL"], json!("pipe-model"));
    assert!(temp_dir.path().join("device_id.json").exists());
}
