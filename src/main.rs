//! vaultdesk: desktop client for an end-to-end encrypted password vault.
//!
//! Entry point: opens the webview window.
//! When built without the `gui` feature, runs a console demo of the offline
//! helpers instead.

#[cfg(feature = "gui")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    vaultdesk::ui::webview_app::run()
}

#[cfg(not(feature = "gui"))]
type DemoResult = Result<(), Box<dyn std::error::Error>>;

#[cfg(not(feature = "gui"))]
fn main() -> DemoResult {
    vaultdesk::logging::init("warn");

    println!();
    println!("vaultdesk v{}: offline demo", env!("CARGO_PKG_VERSION"));
    println!();

    demo_crypto()?;
    demo_generator()?;
    demo_strength();
    demo_helpers();
    demo_preferences()?;

    println!("Build with the `gui` feature for the full client.");
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn section(name: &str) {
    println!("── {} ──", name);
}

#[cfg(not(feature = "gui"))]
fn demo_crypto() -> DemoResult {
    use vaultdesk::services::crypto_service::{CryptoService, CryptoServiceTrait, KEY_LENGTH};
    use vaultdesk::types::settings::KdfParams;
    section("Crypto");

    let crypto = CryptoService::new(KdfParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    });
    let key = crypto.argon2id(b"correct horse battery staple", Some(b"demo@example.com"), KEY_LENGTH)?;
    let sealed = crypto.seal_b64(b"vault item", &key)?;
    let opened = crypto.open_b64(&sealed, &key)?;
    println!("  sealed {} bytes into {} base64 chars", opened.len(), sealed.len());
    println!("  round trip ok: {}", opened == b"vault item");
    println!();
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn demo_generator() -> DemoResult {
    use vaultdesk::services::crypto_service::CryptoService;
    use vaultdesk::services::generator::{generate_password, generate_username, UsernameStyle};
    use vaultdesk::types::settings::GeneratorOptions;
    section("Generators");

    let crypto = CryptoService::default();
    println!("  password: {}", generate_password(&crypto, &GeneratorOptions::default())?);
    println!("  username: {}", generate_username(&crypto, &UsernameStyle::Random)?);
    println!(
        "  email:    {}",
        generate_username(&crypto, &UsernameStyle::Email { provider: "@example.com".into() })?
    );
    println!();
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn demo_strength() {
    use vaultdesk::services::strength::check;
    section("Password strength");

    for pw in ["hunter2", "Password123", "c0rrect-Horse-battery!"] {
        let report = check(pw, "demo@example.com");
        println!("  {:<24} {:>3} {:<12} valid={}", pw, report.score, report.label, report.is_valid);
    }
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_helpers() {
    use vaultdesk::services::datetime::format_bangkok_date;
    use vaultdesk::services::validation::validate_email;
    section("Helpers");

    for email in ["user@example.com", "user@@example", "a@b.c"] {
        println!("  {:<20} valid={}", email, validate_email(email));
    }
    let ts = "2025-05-09 11:30:42.789022+00";
    println!("  {} -> {}", ts, format_bangkok_date(ts));
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_preferences() -> DemoResult {
    use vaultdesk::database::Database;
    use vaultdesk::services::preferences::{PreferenceStore, PreferenceStoreTrait};
    section("Preferences");

    let db = Database::open_in_memory()?;
    let store = PreferenceStore::new(db.connection());
    let colors = store.update_color("card", "#FF0066")?;
    println!("  card color: {}", colors.card);
    println!("  website color: {}", colors.website);
    println!("  generator: {:?}", store.generator_options()?);
    println!();
    Ok(())
}
