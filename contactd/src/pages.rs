//! Server-rendered marketing pages.
//!
//! Templates are embedded into the binary from `templates/` and compiled once at startup, so
//! a template syntax error fails the boot rather than the first request.

use minijinja::{Environment, context};
use rust_embed::RustEmbed;
use serde::Serialize;
use std::fmt;

use crate::config::{SiteConfig, UploadLimitsConfig};

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

/// The static pages the site serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Home,
    Services,
    About,
    Contact,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Services, Page::About, Page::Contact];

    pub fn template_name(self) -> &'static str {
        match self {
            Page::Home => "home.html",
            Page::Services => "services.html",
            Page::About => "about.html",
            Page::Contact => "contact.html",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Services => "Services",
            Page::About => "About",
            Page::Contact => "Contact",
        }
    }

    /// URL path the page is served at
    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Services => "/services",
            Page::About => "/about",
            Page::Contact => "/contact",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Navigation entry exposed to templates
#[derive(Serialize)]
struct NavLink {
    title: &'static str,
    path: &'static str,
    active: bool,
}

/// Compiled page templates plus the site values every page sees
pub struct Pages {
    env: Environment<'static>,
    site: SiteConfig,
    max_files_per_field: usize,
}

impl Pages {
    /// Compile every embedded template
    pub fn load(site: SiteConfig, uploads: &UploadLimitsConfig) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        let mut loaded = 0;
        for name in Templates::iter() {
            let Some(file) = Templates::get(&name) else { continue };
            let source = String::from_utf8_lossy(&file.data).into_owned();
            env.add_template_owned(name.into_owned(), source)?;
            loaded += 1;
        }

        // Fail fast if a page's template was not embedded
        for page in Page::ALL {
            env.get_template(page.template_name())?;
        }

        tracing::debug!(templates = loaded, "Loaded page templates");

        Ok(Self {
            env,
            site,
            max_files_per_field: uploads.max_files_per_field,
        })
    }

    pub fn render(&self, page: Page) -> Result<String, minijinja::Error> {
        let nav: Vec<NavLink> = Page::ALL
            .iter()
            .map(|p| NavLink {
                title: p.title(),
                path: p.path(),
                active: *p == page,
            })
            .collect();

        self.env.get_template(page.template_name())?.render(context! {
            site => &self.site,
            page => page,
            title => page.title(),
            nav => nav,
            contact_endpoint => "/api/contacts",
            max_files_per_field => self.max_files_per_field,
        })
    }
}
