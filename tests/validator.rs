//! Validator rules, structural checks, and cross-server uniqueness.

mod common;

use common::{MemFs, parse_input, server_with, validate};
use serverconf_rs::{Diagnostics, Validator};

fn messages(input: &str) -> Vec<String> {
    validate(input)
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

fn assert_valid(input: &str) {
    let diagnostics = validate(input);
    assert!(diagnostics.is_empty(), "{input}\n{diagnostics}");
}

fn assert_single(input: &str, expected: &str) {
    assert_eq!(messages(input), vec![expected.to_string()], "{input}");
}

// -----------------------------------------------------------
// Structural checks.
// -----------------------------------------------------------

#[test]
fn required_directives_anchor_at_server() {
    let input = "server { location / { } }";
    let diagnostics = validate(input);
    assert_eq!(diagnostics.len(), 2);
    let (config, _) = parse_input(input);
    for diagnostic in &diagnostics {
        assert_eq!(diagnostic.span, config.servers[0].span);
    }
    assert_eq!(
        diagnostics.messages(),
        vec![
            "server block is missing required directive 'listen'",
            "server block is missing required directive 'root'",
        ]
    );
}

#[test]
fn required_directive_in_location_does_not_count() {
    assert_eq!(
        messages("server { listen 80; location / { root /var/www; } }"),
        vec!["server block is missing required directive 'root'"]
    );
}

#[test]
fn every_repeat_is_a_duplicate() {
    let diagnostics = validate(&server_with("    index a;\n    index b;\n    index c;"));
    assert_eq!(
        diagnostics.messages(),
        vec!["duplicate directive 'index'", "duplicate directive 'index'"]
    );
    let lines: Vec<_> = diagnostics.iter().map(|d| d.span.start.line).collect();
    assert_eq!(lines, vec![5, 6]);
}

#[test]
fn duplicate_location_points_back() {
    let input = server_with("    location /api { }\n    location /api { }");
    let diagnostics = validate(&input);
    assert_eq!(
        diagnostics.messages(),
        vec![
            "duplicate location '/api'",
            "previous declaration of location '/api'",
        ]
    );
    let (config, _) = parse_input(&input);
    let locations = &config.servers[0].locations;
    let spans: Vec<_> = diagnostics.iter().map(|d| d.span).collect();
    assert_eq!(spans, vec![locations[1].span, locations[0].span]);
}

#[test]
fn same_location_in_different_servers_is_fine() {
    assert_valid(
        "server { listen 80; root /var/www; location /a { } }\n\
         server { listen 81; root /var/www; location /a { } }",
    );
}

// -----------------------------------------------------------
// Context and dispatch.
// -----------------------------------------------------------

#[test]
fn listen_in_location_is_context_error() {
    assert_single(
        &server_with("    location / { listen 80; }"),
        "'listen' directive is only allowed in server context",
    );
}

#[test]
fn invalid_listen_in_location_reports_context_only() {
    assert_single(
        &server_with("    location / { listen 99999999; }"),
        "'listen' directive is only allowed in server context",
    );
}

#[test]
fn legacy_keywords_are_unknown_directives() {
    for key in ["allow_methods", "auto_index", "cgi_pass", "cgi_extensions", "upload_dir"] {
        assert_single(
            &server_with(&format!("    {key} x;")),
            &format!("unknown directive '{key}'"),
        );
    }
}

#[test]
fn sibling_directives_still_checked() {
    assert_eq!(
        messages(&server_with(
            "    autoindex yes;\n    methods GET;\n    client_max_body_size big;"
        )),
        vec![
            "invalid autoindex value: 'yes', expected 'on' or 'off'",
            "invalid body size: 'big'",
        ]
    );
}

// -----------------------------------------------------------
// listen.
// -----------------------------------------------------------

fn listen(value: &str) -> String {
    format!("server {{ listen {value}; root /var/www; }}")
}

#[test]
fn listen_accepts_ports_and_addresses() {
    for value in ["8080", "1", "65535", "192.168.1.1:8080", "0.0.0.0:80", "localhost:3000"] {
        assert_valid(&listen(value));
    }
}

#[test]
fn listen_rejects_bad_ports() {
    assert_single(&listen("70000"), "invalid port number: '70000'");
    assert_single(&listen("999999"), "invalid port number: '999999'");
    assert_single(&listen("0"), "invalid port number: '0'");
    assert_single(&listen("http"), "invalid port number: 'http'");
}

#[test]
fn listen_rejects_bad_addresses() {
    assert_single(&listen("256.1.1.1:80"), "invalid IP address: '256.1.1.1'");
    assert_single(&listen("example.com:80"), "invalid IP address: 'example.com'");
}

#[test]
fn listen_arity() {
    assert_single(
        "server { listen 80 81; root /var/www; }",
        "'listen' directive requires exactly one value",
    );
    assert_single(
        "server { listen; root /var/www; }",
        "'listen' directive requires exactly one value",
    );
}

// -----------------------------------------------------------
// Paths.
// -----------------------------------------------------------

#[test]
fn root_rules() {
    assert_single(
        "server { listen 80; root var/www; }",
        "invalid root path: 'var/www', it should start with '/'",
    );
    assert_single(
        "server { listen 80; root /nope; }",
        "root path does not exist: '/nope'",
    );
    assert_single(
        "server { listen 80; root /var/www/index.html; }",
        "root path is not a directory: '/var/www/index.html'",
    );
}

#[test]
fn upload_store_rules() {
    assert_valid(&server_with("    upload_store /srv/uploads;"));
    assert_single(
        &server_with("    upload_store /srv/missing;"),
        "upload_store path does not exist: '/srv/missing'",
    );
    assert_single(
        &server_with("    upload_store /a /b;"),
        "'upload_store' directive requires exactly one value",
    );
}

#[test]
fn cgi_extension_rules() {
    assert_valid(&server_with("    cgi_extension .py /usr/bin/python3;"));
    assert_single(
        &server_with("    cgi_extension py /usr/bin/python3;"),
        "invalid CGI extension: 'py', it should start with '.'",
    );
    assert_single(
        &server_with("    cgi_extension .py python3;"),
        "invalid cgi_extension path: 'python3', it should start with '/'",
    );
    assert_single(
        &server_with("    cgi_extension .py /usr/bin/perl;"),
        "cgi_extension path does not exist: '/usr/bin/perl'",
    );
    assert_single(
        &server_with("    cgi_extension .py /usr/bin;"),
        "CGI interpreter cannot be a directory: '/usr/bin'",
    );
    assert_single(
        &server_with("    cgi_extension .html /var/www/index.html;"),
        "CGI interpreter is not executable: '/var/www/index.html'",
    );
    assert_single(
        &server_with("    cgi_extension .py;"),
        "'cgi_extension' directive requires exactly two values",
    );
}

// -----------------------------------------------------------
// Value rules.
// -----------------------------------------------------------

#[test]
fn server_name_rules() {
    assert_valid(&server_with("    server_name example.com api.example.com;"));
    assert_single(
        &server_with("    server_name good.com -bad.com;"),
        "invalid server name: '-bad.com'",
    );
    let long = "a".repeat(256);
    assert_single(
        &server_with(&format!("    server_name {long};")),
        &format!("server name is too long: '{long}', maximum length is 255 characters"),
    );
    assert_single(
        &server_with("    server_name;"),
        "'server_name' directive requires at least one value",
    );
}

#[test]
fn body_size_rules() {
    assert_valid(&server_with("    client_max_body_size 10M;"));
    assert_valid(&server_with("    client_max_body_size 2147483647;"));
    assert_single(
        &server_with("    client_max_body_size 9999999999999g;"),
        "body size too large: '9999999999999g', maximum is 2147483647 bytes",
    );
    assert_single(
        &server_with("    client_max_body_size 2048m;"),
        "body size too large: '2048m', maximum is 2147483647 bytes",
    );
    assert_single(
        &server_with("    client_max_body_size 10t;"),
        "invalid body size: '10t'",
    );
}

#[test]
fn error_page_rules() {
    assert_valid(&server_with("    error_page 404 /404.html;"));
    assert_valid(&server_with("    error_page 500 502 503 504 /50x.html;"));
    assert_single(
        &server_with("    error_page 404 200 /x.html;"),
        "invalid status code: '200', expected a code between 300 and 599",
    );
    assert_single(
        &server_with("    error_page /x.html;"),
        "'error_page' directive requires at least two values",
    );
}

#[test]
fn return_rules() {
    assert_valid(&server_with("    return /elsewhere;"));
    assert_valid(&server_with("    return 301 /elsewhere;"));
    assert_single(
        &server_with("    return 3010 /elsewhere;"),
        "invalid status code: '3010', expected a code between 300 and 599",
    );
    assert_single(
        &server_with("    return 301 /a /b;"),
        "'return' directive requires between 1 and 2 values",
    );
}

#[test]
fn methods_and_index_rules() {
    assert_valid(&server_with("    location / { methods GET POST DELETE; index a b; }"));
    assert_single(
        &server_with("    methods GET HEAD;"),
        "invalid method: 'HEAD', allowed methods are GET, POST and DELETE",
    );
    assert_single(
        &server_with("    index;"),
        "'index' directive requires at least one value",
    );
}

// -----------------------------------------------------------
// Cross-server uniqueness.
// -----------------------------------------------------------

#[test]
fn default_server_duplicate_points_at_first_block() {
    let input = "server { listen 80; root /var/www; }\nserver { listen 80; root /var/www; }\n";
    let diagnostics = validate(input);
    assert_eq!(
        diagnostics.messages(),
        vec![
            "duplicate listen port '80' with default server_name",
            "previous declaration of this listen port with default server_name",
        ]
    );
    let (config, _) = parse_input(input);
    let spans: Vec<_> = diagnostics.iter().map(|d| d.span).collect();
    assert_eq!(spans, vec![config.servers[1].span, config.servers[0].span]);
}

#[test]
fn named_servers_share_a_port() {
    assert_valid(
        "server { listen 80; root /var/www; server_name a.com; }\n\
         server { listen 80; root /var/www; server_name b.com; }\n\
         server { listen 80; root /var/www; }",
    );
}

#[test]
fn named_duplicate_anchors_at_server_name() {
    let input = "server { listen 80; root /var/www; server_name a.com; }\n\
                 server { listen 80; root /var/www; server_name a.com; }";
    let diagnostics = validate(input);
    let (config, _) = parse_input(input);
    let first = config.servers[0].directive("server_name").expect("name").span;
    let second = config.servers[1].directive("server_name").expect("name").span;
    assert_eq!(
        diagnostics.messages(),
        vec![
            "duplicate server_name 'a.com' with listen port '80'",
            "previous declaration of this server_name and port combination",
        ]
    );
    let spans: Vec<_> = diagnostics.iter().map(|d| d.span).collect();
    assert_eq!(spans, vec![second, first]);
}

#[test]
fn repeated_name_in_one_server_is_not_a_clash() {
    assert_valid("server { listen 80; root /var/www; server_name a.com a.com; }");
}

#[test]
fn repeated_name_still_clashes_across_servers() {
    let diagnostics = validate(
        "server { listen 80; root /var/www; server_name a.com a.com; }\n\
         server { listen 80; root /var/www; server_name a.com; }",
    );
    assert_eq!(
        diagnostics.messages(),
        vec![
            "duplicate server_name 'a.com' with listen port '80'",
            "previous declaration of this server_name and port combination",
        ]
    );
}

#[test]
fn listen_keys_compare_as_written() {
    assert_valid(
        "server { listen 80; root /var/www; }\n\
         server { listen 127.0.0.1:80; root /var/www; }",
    );
}

#[test]
fn uniqueness_skipped_when_anything_failed() {
    assert_eq!(
        messages(
            "server { listen 80; root /var/www; }\n\
             server { listen 80; root /var/www; }\n\
             server { listen 80; }"
        ),
        vec![
            "duplicate listen port '80' with default server_name",
            "previous declaration of this listen port with default server_name",
            "server block is missing required directive 'root'",
        ]
    );
    assert_eq!(
        messages(
            "server { listen 80; }\n\
             server { listen 80; root /var/www; }\n\
             server { listen 80; root /var/www; }"
        ),
        vec!["server block is missing required directive 'root'"]
    );
}

#[test]
fn validator_reuse_starts_clean() {
    let (config, _) = parse_input("server { listen 80; root /var/www; }");
    let fs = MemFs::standard();
    let mut validator = Validator::new(&fs);
    for _ in 0..3 {
        let mut diagnostics = Diagnostics::new();
        validator.validate(&config, &mut diagnostics);
        assert!(diagnostics.is_empty(), "{diagnostics}");
    }
}
