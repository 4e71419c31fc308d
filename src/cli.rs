//! Command-line surface: launch flags for the window plus headless
//! subcommands that share the same catalog, resolution and fetch code.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::app::controllers::session::GuideSession;
use crate::app::domain::account::{LoginData, StoredToken};
use crate::app::domain::catalog::Catalog;
use crate::app::domain::config::GuideConfig;
use crate::app::domain::launch::LaunchRequest;
use crate::app::infrastructure::error::{PortalError, Result};
use crate::app::services::account_store::{AccountStore, default_account_path};
use crate::app::services::fetcher::{ContentFetcher, HttpFetcher};
use crate::app::services::portal::PortalClient;
use crate::app::services::preference_store::{FileBackend, PreferenceStore, StorageBackend};

const INVALID_RESPONSE: &str = "Invalid response from server";

/// Native viewer for multilingual markdown guides
#[derive(Parser, Debug)]
#[command(name = "GuidePad", version, about, long_about = None)]
pub struct Cli {
    /// Guide to open, by document id.
    #[arg(long = "type", global = true, value_name = "DOC")]
    pub document: Option<String>,

    /// Language to open the guide in.
    #[arg(long, global = true, value_name = "LANG")]
    pub lang: Option<String>,

    /// Launch query string such as `?type=setup&lang=fr`. `--type` and
    /// `--lang` take precedence over it.
    #[arg(long, global = true)]
    pub query: Option<String>,

    /// Use this catalog instead of the bundled one.
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Content host for relative locations. An empty value reads them from
    /// disk next to the catalog.
    #[arg(long, global = true, value_name = "URL")]
    pub content_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the guides in the catalog.
    Docs,
    /// Resolve a guide the way the window does and print its markdown.
    Show,
    /// Request a verification token for the signed-in account, or for the
    /// given ids. A live token is reused until it expires.
    Token {
        #[arg(long, requires = "username")]
        discord_id: Option<String>,
        #[arg(long, requires = "discord_id")]
        username: Option<String>,
    },
    /// Look up the account behind a verification token, by default the
    /// stored one.
    Verify { token: Option<String> },
    /// Sign in with the profile JSON handed over by the sign-in service.
    Login { file: PathBuf },
    /// Show the signed-in account.
    Profile,
    /// Forget the signed-in account and its token.
    Logout,
}

impl Cli {
    pub fn launch_request(&self) -> LaunchRequest {
        let flags = LaunchRequest::new(self.document.clone(), self.lang.clone());
        match &self.query {
            Some(query) => flags.or(LaunchRequest::from_query(query)),
            None => flags,
        }
    }

    /// Apply flag overrides on top of the loaded config.
    pub fn apply_to(&self, config: &mut GuideConfig) {
        if let Some(path) = &self.catalog {
            config.catalog_path = Some(path.clone());
        }
        if let Some(url) = &self.content_url {
            config.content_base_url = (!url.trim().is_empty()).then(|| url.clone());
        }
    }
}

/// Run a headless subcommand against the real preference file and network.
pub fn run(command: &Command, request: &LaunchRequest, config: &GuideConfig, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Docs => {
            let catalog = config.load_catalog()?;
            run_docs(&catalog, out)
        }
        Command::Show => {
            let catalog = config.load_catalog()?;
            let mut session = GuideSession::new(catalog, PreferenceStore::new(FileBackend::default()));
            let fetcher = HttpFetcher::from_config(config);
            run_show(&mut session, &fetcher, request, out)
        }
        Command::Token { discord_id, username } => {
            let client = PortalClient::new(config.portal_base()?).with_timeout(Some(config.fetch_timeout()));
            let ids = discord_id.as_deref().zip(username.as_deref());
            run_token(&client, &accounts(), ids, SystemTime::now(), out)
        }
        Command::Verify { token } => {
            let client = PortalClient::new(config.portal_base()?).with_timeout(Some(config.fetch_timeout()));
            run_verify(&client, &accounts(), token.as_deref(), SystemTime::now(), out)
        }
        Command::Login { file } => run_login(&accounts(), file, SystemTime::now(), out),
        Command::Profile => run_profile(&accounts(), SystemTime::now(), out),
        Command::Logout => run_logout(&accounts(), out),
    }
}

fn accounts() -> AccountStore<FileBackend> {
    AccountStore::new(FileBackend::new(default_account_path()))
}

pub fn run_docs(catalog: &Catalog, out: &mut impl Write) -> Result<()> {
    for doc in catalog.list_documents() {
        let languages: Vec<&str> = doc.languages.iter().map(|l| l.id.as_str()).collect();
        writeln!(
            out,
            "{}\t{}\t{} (default {})",
            doc.id,
            doc.name,
            languages.join(","),
            doc.default_language_id
        )?;
    }
    for problem in catalog.validate() {
        writeln!(out, "warning: {}", problem)?;
    }
    Ok(())
}

pub fn run_show<B: StorageBackend>(
    session: &mut GuideSession<B>,
    fetcher: &dyn ContentFetcher,
    request: &LaunchRequest,
    out: &mut impl Write,
) -> Result<()> {
    let target = session.start(request.document(), request.language());

    if let Some(notice) = session.notice() {
        writeln!(out, "notice: {}", notice.message)?;
    }

    let Some(target) = target else {
        if session.catalog().is_empty() {
            writeln!(out, "No guides available")?;
        }
        return Ok(());
    };

    writeln!(out, "# {} [{}]", target.document_id, target.language_id)?;
    let markdown = fetcher.fetch(&target.location)?;
    writeln!(out, "{}", markdown)?;
    Ok(())
}

/// Request a token for `ids`, or for the signed-in account when `ids` is
/// `None`. Issued tokens are stored and reused while live.
pub fn run_token<B: StorageBackend>(
    client: &PortalClient,
    accounts: &AccountStore<B>,
    ids: Option<(&str, &str)>,
    now: SystemTime,
    out: &mut impl Write,
) -> Result<()> {
    let login = accounts.login();
    let (discord_id, username) = match (ids, &login) {
        (Some((id, name)), _) => (id.to_string(), name.to_string()),
        (None, Some(login)) if login.verified => {
            writeln!(out, "{} is already verified", login.username)?;
            return Ok(());
        }
        (None, Some(login)) => (login.discord_id(), login.username.clone()),
        (None, None) => return Err(PortalError::NotLoggedIn.into()),
    };

    if let Some(token) = accounts.token(now).filter(|t| t.discord_id == discord_id) {
        return print_token(client, &token, now, out);
    }

    let reply = client.generate_token(&discord_id, &username);

    if let Some(error) = reply.error {
        return Err(PortalError::Rejected(error).into());
    }
    if let Some(verified) = reply.verified {
        if login.is_some_and(|l| l.discord_id() == discord_id) {
            accounts.update_verification_status(true)?;
        }
        writeln!(out, "verified: {}", verified)?;
        return Ok(());
    }
    let Some(token) = reply.token else {
        return Err(PortalError::Rejected(INVALID_RESPONSE.to_string()).into());
    };

    let stored = accounts.set_token(&token, &discord_id, now)?;
    print_token(client, &stored, now, out)
}

fn print_token(client: &PortalClient, token: &StoredToken, now: SystemTime, out: &mut impl Write) -> Result<()> {
    writeln!(out, "token: {} (expires in {}s)", token.value, token.remaining(now).as_secs())?;
    writeln!(out, "continue at: {}", client.oauth2_start_url(&token.value)?)?;
    Ok(())
}

pub fn run_verify<B: StorageBackend>(
    client: &PortalClient,
    accounts: &AccountStore<B>,
    token: Option<&str>,
    now: SystemTime,
    out: &mut impl Write,
) -> Result<()> {
    let (token, stored) = match token {
        Some(token) => (token.to_string(), false),
        None => match accounts.token(now) {
            Some(stored) => (stored.value, true),
            None => return Err(PortalError::NoToken.into()),
        },
    };

    let data = match client.fetch_verify_data(&token) {
        Ok(data) => data,
        Err(e) => {
            // The portal no longer knows this token
            let refused = matches!(&e, PortalError::Rejected(_))
                || matches!(&e, PortalError::Status(code) if (400..500).contains(code));
            if stored && refused {
                accounts.remove_token()?;
            }
            return Err(e.into());
        }
    };

    writeln!(out, "{} (@{})", data.display_name, data.username)?;
    writeln!(out, "discord id: {}", data.discord_id)?;
    if !data.avatar.is_empty() {
        writeln!(out, "avatar: {}", data.avatar)?;
    }
    writeln!(out, "continue at: {}", client.oauth2_start_url(&data.token)?)?;
    Ok(())
}

pub fn run_login<B: StorageBackend>(
    accounts: &AccountStore<B>,
    file: &Path,
    now: SystemTime,
    out: &mut impl Write,
) -> Result<()> {
    let raw = fs::read_to_string(file)?;
    let login: LoginData = serde_json::from_str(&raw)?;
    accounts.set_login(login)?;
    run_profile(accounts, now, out)
}

pub fn run_profile<B: StorageBackend>(accounts: &AccountStore<B>, now: SystemTime, out: &mut impl Write) -> Result<()> {
    let Some(login) = accounts.login() else {
        writeln!(out, "Not logged in")?;
        return Ok(());
    };

    writeln!(out, "{} (@{})", login.name, login.username)?;
    writeln!(out, "discord id: {}", login.userid)?;
    writeln!(out, "verified: {}", if login.verified { "yes" } else { "no" })?;
    writeln!(out, "accent: {}", login.ring_color())?;
    if !login.avatar.is_empty() {
        writeln!(out, "avatar: {}", login.avatar)?;
    }
    if let Some(decoration) = &login.avatar_decoration_data {
        writeln!(out, "decoration: {}", decoration.asset)?;
    }
    if !login.auth_at.is_empty() {
        writeln!(out, "signed in: {}", login.auth_at)?;
    }
    if let Some(token) = accounts.token(now).filter(|t| t.discord_id == login.discord_id()) {
        writeln!(out, "token: {} (expires in {}s)", token.value, token.remaining(now).as_secs())?;
    }
    Ok(())
}

pub fn run_logout<B: StorageBackend>(accounts: &AccountStore<B>, out: &mut impl Write) -> Result<()> {
    accounts.logout()?;
    writeln!(out, "Logged out")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::infrastructure::error::{AppError, FetchError};
    use crate::app::services::preference_store::MemoryBackend;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;
    use url::Url;

    const FERRIS: &str = r#"{"userid": 42, "username": "ferris", "name": "Ferris", "avatar": "a1b2", "accent_color": 2278750, "verified": false, "authAt": "2026-10-01T12:00:00Z"}"#;

    struct Canned;

    impl ContentFetcher for Canned {
        fn fetch(&self, location: &str) -> std::result::Result<String, FetchError> {
            if location.ends_with("/en.md") {
                Ok(format!("content of {}", location))
            } else {
                Err(FetchError::Status {
                    code: 404,
                    reason: "Not Found".to_string(),
                })
            }
        }
    }

    fn session() -> GuideSession<MemoryBackend> {
        GuideSession::new(Catalog::bundled().unwrap(), PreferenceStore::new(MemoryBackend::default()))
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn signed_in(json: &str) -> AccountStore<MemoryBackend> {
        let accounts = AccountStore::new(MemoryBackend::default());
        accounts.set_login(serde_json::from_str(json).unwrap()).unwrap();
        accounts
    }

    fn closed_portal() -> PortalClient {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        PortalClient::new(Url::parse(&format!("http://{}", addr)).unwrap())
    }

    /// Portal that answers a single request with a 200 and `body`.
    fn portal_once(body: &'static str) -> (PortalClient, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 2048];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                let Some(head_end) = text.find("\r\n\r\n") else {
                    continue;
                };
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + content_length {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        (PortalClient::new(Url::parse(&format!("http://{}", addr)).unwrap()), handle)
    }

    #[test]
    fn test_parse_launch_flags() {
        let cli = Cli::try_parse_from(["GuidePad", "--type", "faq", "--query", "?type=setup&lang=hi"]).unwrap();
        let request = cli.launch_request();
        assert_eq!(request.document(), Some("faq"));
        assert_eq!(request.language(), Some("hi"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["GuidePad", "show", "--lang", "es"]).unwrap();
        assert_eq!(cli.command, Some(Command::Show));
        assert_eq!(cli.lang.as_deref(), Some("es"));

        let cli = Cli::try_parse_from(["GuidePad", "token", "--discord-id", "42", "--username", "ferris"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Token {
                discord_id: Some("42".to_string()),
                username: Some("ferris".to_string())
            })
        );
        assert!(Cli::try_parse_from(["GuidePad", "token", "--discord-id", "42"]).is_err());

        let cli = Cli::try_parse_from(["GuidePad", "verify"]).unwrap();
        assert_eq!(cli.command, Some(Command::Verify { token: None }));

        let cli = Cli::try_parse_from(["GuidePad", "login", "me.json"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Login {
                file: PathBuf::from("me.json")
            })
        );
        assert!(Cli::try_parse_from(["GuidePad", "login"]).is_err());
        assert_eq!(Cli::try_parse_from(["GuidePad", "logout"]).unwrap().command, Some(Command::Logout));
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from(["GuidePad", "--catalog", "/tmp/docs.json", "--content-url", ""]).unwrap();
        let mut config = GuideConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/docs.json")));
        assert!(config.content_base_url.is_none());
    }

    #[test]
    fn test_run_docs_lists_catalog() {
        let mut buf = Vec::new();
        run_docs(&Catalog::bundled().unwrap(), &mut buf).unwrap();
        let text = output(buf);
        assert!(text.starts_with("setup\t"));
        assert!(text.contains("verification\tVerifying Your Membership\ten,hi,es (default en)"));
        assert!(!text.contains("warning:"));
    }

    #[test]
    fn test_run_show_prints_notice_and_content() {
        let mut buf = Vec::new();
        let request = LaunchRequest::from_query("?type=setup&lang=fr");
        run_show(&mut session(), &Canned, &request, &mut buf).unwrap();

        let text = output(buf);
        assert!(text.contains("notice: Language not available for this guide"));
        assert!(text.contains("# setup [en]"));
        assert!(text.contains("content of /guide/docs/setup/en.md"));
    }

    #[test]
    fn test_run_show_propagates_fetch_error() {
        let mut buf = Vec::new();
        let request = LaunchRequest::new(Some("setup".to_string()), Some("hi".to_string()));
        let result = run_show(&mut session(), &Canned, &request, &mut buf);
        assert!(matches!(result, Err(AppError::Fetch(FetchError::Status { code: 404, .. }))));
    }

    #[test]
    fn test_run_token_reports_unavailable_service() {
        let accounts = AccountStore::new(MemoryBackend::default());
        let mut buf = Vec::new();
        match run_token(&closed_portal(), &accounts, Some(("42", "ferris")), at(0), &mut buf) {
            Err(AppError::Portal(PortalError::Rejected(message))) => {
                assert_eq!(message, "Service temporarily unavailable");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(accounts.token(at(0)).is_none());
    }

    #[test]
    fn test_run_token_needs_an_account() {
        let accounts = AccountStore::new(MemoryBackend::default());
        let result = run_token(&closed_portal(), &accounts, None, at(0), &mut Vec::new());
        assert!(matches!(result, Err(AppError::Portal(PortalError::NotLoggedIn))));
    }

    #[test]
    fn test_run_token_stores_and_reuses_token() {
        let accounts = signed_in(FERRIS);
        let (client, server) = portal_once(r#"{"token":"abc"}"#);

        let mut buf = Vec::new();
        run_token(&client, &accounts, None, at(1_000), &mut buf).unwrap();
        server.join().unwrap();
        assert!(output(buf).contains("token: abc (expires in 600s)"));

        let stored = accounts.token(at(1_000)).unwrap();
        assert_eq!((stored.value.as_str(), stored.discord_id.as_str()), ("abc", "42"));

        // Within ten minutes no request is made
        let mut buf = Vec::new();
        run_token(&closed_portal(), &accounts, None, at(1_060), &mut buf).unwrap();
        let text = output(buf);
        assert!(text.contains("token: abc (expires in 540s)"));
        assert!(text.contains("/oauth2/start/?token=abc"));

        // After that the portal is asked again
        let result = run_token(&closed_portal(), &accounts, None, at(1_600), &mut Vec::new());
        assert!(matches!(result, Err(AppError::Portal(PortalError::Rejected(_)))));
    }

    #[test]
    fn test_run_token_records_verified_account() {
        let accounts = signed_in(FERRIS);
        let (client, server) = portal_once(r#"{"verified":"Already verified"}"#);

        let mut buf = Vec::new();
        run_token(&client, &accounts, None, at(0), &mut buf).unwrap();
        server.join().unwrap();

        assert!(output(buf).contains("verified: Already verified"));
        assert!(accounts.login().unwrap().verified);
        assert!(accounts.token(at(0)).is_none());

        let mut buf = Vec::new();
        run_token(&closed_portal(), &accounts, None, at(0), &mut buf).unwrap();
        assert_eq!(output(buf), "ferris is already verified\n");
    }

    #[test]
    fn test_run_verify_uses_stored_token() {
        let accounts = signed_in(FERRIS);
        let result = run_verify(&closed_portal(), &accounts, None, at(0), &mut Vec::new());
        assert!(matches!(result, Err(AppError::Portal(PortalError::NoToken))));

        accounts.set_token("t1", "42", at(0)).unwrap();
        let (client, server) = portal_once(
            r#"{"token":"t1","discordId":"42","username":"ferris","displayName":"Ferris","avatar":""}"#,
        );
        let mut buf = Vec::new();
        run_verify(&client, &accounts, None, at(10), &mut buf).unwrap();
        server.join().unwrap();

        let text = output(buf);
        assert!(text.starts_with("Ferris (@ferris)\n"));
        assert!(text.contains("/oauth2/start/?token=t1"));
    }

    #[test]
    fn test_run_verify_drops_refused_token() {
        let accounts = signed_in(FERRIS);
        accounts.set_token("t1", "42", at(0)).unwrap();
        let (client, server) = portal_once(r#"{"error":"Token expired"}"#);

        let result = run_verify(&client, &accounts, None, at(10), &mut Vec::new());
        server.join().unwrap();

        assert!(matches!(result, Err(AppError::Portal(PortalError::Rejected(_)))));
        assert!(accounts.token(at(10)).is_none());
        assert!(accounts.login().is_some());
    }

    #[test]
    fn test_login_profile_logout() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("login.json");
        fs::write(&file, FERRIS).unwrap();
        let accounts = AccountStore::new(MemoryBackend::default());

        let mut buf = Vec::new();
        run_login(&accounts, &file, at(0), &mut buf).unwrap();
        let text = output(buf);
        assert!(text.starts_with("Ferris (@ferris)\n"));
        assert!(text.contains("verified: no"));
        assert!(text.contains("accent: #22c55e"));
        assert!(text.contains("signed in: 2026-10-01T12:00:00Z"));

        accounts.set_token("abc", "42", at(0)).unwrap();
        let mut buf = Vec::new();
        run_profile(&accounts, at(100), &mut buf).unwrap();
        assert!(output(buf).contains("token: abc (expires in 500s)"));

        let mut buf = Vec::new();
        run_logout(&accounts, &mut buf).unwrap();
        run_profile(&accounts, at(100), &mut buf).unwrap();
        assert_eq!(output(buf), "Logged out\nNot logged in\n");
    }

    #[test]
    fn test_profile_dark_accent_uses_default_ring() {
        let accounts = signed_in(r#"{"userid": 7, "username": "night", "name": "Night", "accent_color": 328965}"#);
        let mut buf = Vec::new();
        run_profile(&accounts, at(0), &mut buf).unwrap();
        assert!(output(buf).contains("accent: #a855f7"));
    }

    #[test]
    fn test_login_rejects_malformed_profile() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("login.json");
        fs::write(&file, r#"{"username": "no id"}"#).unwrap();
        let accounts = AccountStore::new(MemoryBackend::default());

        let result = run_login(&accounts, &file, at(0), &mut Vec::new());
        assert!(matches!(result, Err(AppError::Json(_))));
        assert!(accounts.login().is_none());
    }
}
