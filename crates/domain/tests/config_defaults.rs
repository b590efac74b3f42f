use sb_domain::config::{parse_yaml, ServerDescriptor, TransportKind};

#[test]
fn stdio_and_http_entries_keep_order_and_defaults() {
    let raw = r#"
mcp_servers:
  - name: database
    type: stdio
    description: Customer database
    command: python
    args: ["mcp_servers/database_server.py"]
    env:
      LOG_LEVEL: debug
  - name: email
    type: http
    url: http://localhost:8080/mcp
"#;
    let cfg = parse_yaml(raw).unwrap();
    assert_eq!(cfg.mcp_servers.len(), 2);

    let db = &cfg.mcp_servers[0];
    assert_eq!(db.name, "database");
    assert_eq!(db.transport_kind, TransportKind::Stdio);
    assert_eq!(db.command, "python");
    assert_eq!(db.args, vec!["mcp_servers/database_server.py".to_string()]);
    assert_eq!(db.env.get("LOG_LEVEL").unwrap(), "debug");
    assert!(db.url.is_empty());

    let email = &cfg.mcp_servers[1];
    assert_eq!(email.name, "email");
    assert_eq!(email.transport_kind, TransportKind::Http);
    assert_eq!(email.url, "http://localhost:8080/mcp");
    assert!(email.enabled);
    assert!(email.description.is_empty());
    assert!(email.command.is_empty());
    assert!(email.args.is_empty());
    assert!(email.env.is_empty());
}

#[test]
fn single_stdio_entry() {
    let raw = r#"
mcp_servers:
  - name: db
    type: stdio
    command: mock-db
    enabled: true
"#;
    let cfg = parse_yaml(raw).unwrap();
    assert_eq!(cfg.mcp_servers.len(), 1);
    let db = &cfg.mcp_servers[0];
    assert_eq!(db.transport_kind, TransportKind::Stdio);
    assert_eq!(db.command, "mock-db");
    assert!(db.args.is_empty());
    assert!(db.env.is_empty());
}

#[test]
fn type_defaults_to_stdio() {
    let cfg = parse_yaml("mcp_servers:\n  - name: test\n    command: echo\n").unwrap();
    assert_eq!(cfg.mcp_servers[0].transport_kind, TransportKind::Stdio);
}

#[test]
fn disabled_entry() {
    let cfg = parse_yaml("mcp_servers:\n  - name: off\n    enabled: false\n").unwrap();
    assert!(!cfg.mcp_servers[0].enabled);
}

#[test]
fn streamable_http_and_sse() {
    let raw = r#"
mcp_servers:
  - name: a
    type: streamableHttp
    url: http://localhost:1/mcp
  - name: b
    type: sse
    url: http://localhost:2/sse
  - name: c
    type: carrier-pigeon
"#;
    let cfg = parse_yaml(raw).unwrap();
    assert_eq!(cfg.mcp_servers[0].transport_kind, TransportKind::StreamableHttp);
    assert_eq!(cfg.mcp_servers[1].transport_kind, TransportKind::Sse);
    assert_eq!(
        cfg.mcp_servers[2].transport_kind,
        TransportKind::Unknown("carrier-pigeon".into())
    );
}

#[test]
fn no_server_list_is_empty() {
    let cfg = parse_yaml("other_section:\n  key: value\n").unwrap();
    assert!(cfg.mcp_servers.is_empty());
}

#[test]
fn descriptor_constructors() {
    let s = ServerDescriptor::stdio("fs", "npx", ["-y", "server-filesystem"]);
    assert_eq!(s.transport_kind, TransportKind::Stdio);
    assert_eq!(s.args.len(), 2);
    assert!(s.enabled);

    let h = ServerDescriptor::http("remote", "http://localhost:9999");
    assert_eq!(h.transport_kind, TransportKind::Http);
    assert_eq!(h.url, "http://localhost:9999");
}
