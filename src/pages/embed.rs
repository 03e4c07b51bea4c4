use rust_embed::Embed;

/// Page shells and their static assets (public; gating happens per route)
#[derive(Embed)]
#[folder = "pages/"]
pub struct PageAssets;
