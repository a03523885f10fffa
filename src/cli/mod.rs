//!
//! agendo interactive shell
//! -------------------------
//! Line-oriented interpreter that drives the session, workspace and routing
//! core against a live backend: authenticate, inspect and switch workspaces,
//! and resolve navigation targets the way the router would.

pub mod outputformatter;

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::app::App;
use crate::routing::{Resolution, ROUTES};
use crate::session::RegisterRole;
use crate::workspace::CreateWorkspaceRequest;
use outputformatter::print_table;

pub fn print_shell_help() {
    eprintln!(
        "Commands:\n  login <email> <password>                  authenticate and open a session\n  register <name> <email> <password> <owner|client>\n                                            create an account (role is fixed at creation)\n  logout                                    end the session and clear durable state\n  whoami                                    show the current identity\n  workspaces                                list workspaces for the current identity\n  use <workspace-id> | use none             switch (or clear) the active workspace\n  create-workspace <name> <slug> <segment>  onboard a new workspace, then refresh\n  refresh                                   reload the workspace list\n  open <path>                               resolve a path through the route table and gate\n  routes                                    show the route table\n  landing                                   show where the authenticated index would navigate\n  status                                    session/workspace summary\n  help                                      this help\n  quit | exit                               leave the shell"
    );
}

/// Run the interactive loop until EOF or `quit`.
pub async fn run_shell(app: &App) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("agendo> ");
        io::stdout().flush().ok();
        let Some(line) = lines.next() else { break };
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        match parts[0] {
            "quit" | "exit" => break,
            "help" => print_shell_help(),
            "status" => cmd_status(app),
            "whoami" => cmd_whoami(app),
            "login" => cmd_login(app, &parts[1..]).await,
            "register" => cmd_register(app, &parts[1..]).await,
            "logout" => cmd_logout(app),
            "workspaces" => cmd_workspaces(app),
            "use" => cmd_use(app, &parts[1..]),
            "create-workspace" => cmd_create_workspace(app, &parts[1..]).await,
            "refresh" => {
                if let Err(e) = app.workspaces.refresh().await {
                    eprintln!("refresh failed: {}", e);
                }
            }
            "open" => cmd_open(app, &parts[1..]),
            "routes" => cmd_routes(),
            "landing" => match app.landing() {
                Some(path) => println!("{}", path),
                None => println!("(not authenticated)"),
            },
            unk => {
                eprintln!("unrecognized command: {} (try 'help')", unk);
            }
        }
    }
    Ok(())
}

fn cmd_status(app: &App) {
    println!("api: {}", app.config.api_url);
    match app.session.identity() {
        Some(id) => println!("session: {} <{}> role={}", id.name, id.email, id.role),
        None => println!(
            "session: {}",
            if app.session.is_loading() { "resolving…" } else { "anonymous" }
        ),
    }
    match app.workspaces.active() {
        Some(ws) => println!("workspace: {} ({})", ws.name, ws.id),
        None => println!("workspace: none"),
    }
}

fn cmd_whoami(app: &App) {
    match app.session.identity() {
        Some(id) => println!("{} <{}> role={} id={}", id.name, id.email, id.role, id.id),
        None => println!("(not authenticated)"),
    }
}

async fn cmd_login(app: &App, args: &[&str]) {
    let [email, password] = args else {
        eprintln!("usage: login <email> <password>");
        return;
    };
    match app.session.login(email, password).await {
        Ok(identity) => {
            println!("logged in as {} ({})", identity.name, identity.role);
            if let Err(e) = app.workspaces.load().await {
                eprintln!("workspace load failed: {}", e);
            }
            if let Some(path) = app.landing() {
                println!("-> {}", path);
            }
        }
        Err(e) => eprintln!("login failed: {}", e),
    }
}

async fn cmd_register(app: &App, args: &[&str]) {
    let [name, email, password, role] = args else {
        eprintln!("usage: register <name> <email> <password> <owner|client>");
        return;
    };
    let role = match *role {
        "owner" => RegisterRole::Owner,
        "client" => RegisterRole::Client,
        other => {
            eprintln!("unknown role '{}': expected owner or client", other);
            return;
        }
    };
    match app.session.register(name, email, password, role).await {
        Ok(identity) => {
            println!("registered {} ({})", identity.name, identity.role);
            if let Err(e) = app.workspaces.load().await {
                eprintln!("workspace load failed: {}", e);
            }
            if let Some(path) = app.landing() {
                println!("-> {}", path);
            }
        }
        Err(e) => eprintln!("registration failed: {}", e),
    }
}

fn cmd_logout(app: &App) {
    if let Err(e) = app.session.logout() {
        eprintln!("logout: durable state not fully cleared: {}", e);
    }
    app.workspaces.reset();
    println!("logged out");
}

fn cmd_workspaces(app: &App) {
    let active_id = app.workspaces.active().map(|w| w.id);
    let rows: Vec<Vec<String>> = app
        .workspaces
        .workspaces()
        .iter()
        .map(|w| {
            vec![
                if active_id.as_deref() == Some(w.id.as_str()) { "*".to_string() } else { String::new() },
                w.id.clone(),
                w.name.clone(),
                w.slug.clone(),
                w.segment.clone(),
            ]
        })
        .collect();
    if !print_table(&["", "id", "name", "slug", "segment"], &rows) {
        println!("(no workspaces; create one with 'create-workspace')");
    }
}

fn cmd_use(app: &App, args: &[&str]) {
    let [target] = args else {
        eprintln!("usage: use <workspace-id> | use none");
        return;
    };
    if *target == "none" {
        if let Err(e) = app.workspaces.set_active(None) {
            eprintln!("use: {}", e);
        }
        return;
    }
    let found = app.workspaces.workspaces().into_iter().find(|w| w.id == *target || w.slug == *target);
    match found {
        Some(ws) => {
            if let Err(e) = app.workspaces.set_active(Some(&ws)) {
                eprintln!("use: {}", e);
            } else {
                println!("active workspace: {} ({})", ws.name, ws.id);
            }
        }
        None => eprintln!("no loaded workspace with id or slug '{}'", target),
    }
}

async fn cmd_create_workspace(app: &App, args: &[&str]) {
    let [name, slug, segment] = args else {
        eprintln!("usage: create-workspace <name> <slug> <segment>");
        return;
    };
    let req = CreateWorkspaceRequest {
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        segment: segment.to_string(),
        city: None,
        address: None,
        phone: None,
        email: None,
    };
    // Creation changes membership; the resolver reloads to pick it up.
    match app.directory.create_workspace(&req).await {
        Ok(ws) => {
            println!("created workspace {} ({})", ws.name, ws.id);
            if let Err(e) = app.workspaces.refresh().await {
                eprintln!("refresh failed: {}", e);
            }
        }
        Err(e) => eprintln!("create-workspace failed: {}", e),
    }
}

fn cmd_open(app: &App, args: &[&str]) {
    let [path] = args else {
        eprintln!("usage: open <path>");
        return;
    };
    match app.resolve(path) {
        Resolution::Render(entry) => println!("render {} (route {})", path, entry.path),
        Resolution::Redirect(target) => println!("redirect -> {}", target),
    }
}

fn cmd_routes() {
    let rows: Vec<Vec<String>> = ROUTES
        .iter()
        .map(|r| {
            let access = match r.guard {
                None => "public".to_string(),
                Some([]) => "any authenticated".to_string(),
                Some(roles) => roles.iter().map(|x| x.as_str()).collect::<Vec<_>>().join(", "),
            };
            vec![r.path.to_string(), access]
        })
        .collect();
    print_table(&["path", "access"], &rows);
}
