use anyhow::Result;
use chrono::Duration;
use portcullis_common::{StaticAuthorizationContext, SystemClock};
use portcullis_store::MemoryResourceStore;
use portcullis_token::{IssuerPolicy, Signer, TokenCodec, TokenIssuer};

#[tokio::main]
pub async fn main() -> Result<()> {
    let secret = std::env::var("PORTCULLIS_SECRET")?;

    let store = MemoryResourceStore::default();
    let identifier = store
        .put("report.pdf", "application/pdf", &b"not really a pdf"[..])
        .await;

    let issuer = TokenIssuer::new(
        TokenCodec::new(Signer::new(secret)),
        SystemClock,
        "https://example.com/files".parse()?,
    );
    let auth = StaticAuthorizationContext::new("session-fingerprint", ["editor"]);

    let public = issuer.issue(&identifier, &IssuerPolicy::public(), &auth)?;
    println!("public:        {public}");

    let expiring = issuer.issue(
        &identifier,
        &IssuerPolicy::expiring(Duration::hours(1)),
        &auth,
    )?;
    println!("expiring:      {expiring}");

    let session_bound = issuer.issue(&identifier, &IssuerPolicy::default(), &auth)?;
    println!("session-bound: {session_bound}");

    let role_bound = issuer.issue(&identifier, &IssuerPolicy::for_role("editor"), &auth)?;
    println!("role-bound:    {role_bound}");

    Ok(())
}
