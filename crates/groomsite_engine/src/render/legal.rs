use crate::render::{PageShell, RenderContext, escape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegalPage {
    Privacy,
    Terms,
    Contact,
    About,
}

pub const LEGAL_PAGES: [LegalPage; 4] = [
    LegalPage::Privacy,
    LegalPage::Terms,
    LegalPage::Contact,
    LegalPage::About,
];

impl LegalPage {
    pub fn slug(self) -> &'static str {
        match self {
            LegalPage::Privacy => "privacy",
            LegalPage::Terms => "terms",
            LegalPage::Contact => "contact",
            LegalPage::About => "about",
        }
    }

    fn heading(self) -> &'static str {
        match self {
            LegalPage::Privacy => "Privacy Policy",
            LegalPage::Terms => "Terms of Service",
            LegalPage::Contact => "Contact Us",
            LegalPage::About => "About Us",
        }
    }

    fn description(self) -> &'static str {
        match self {
            LegalPage::Privacy => {
                "Privacy Policy for our mobile pet grooming directory. Learn how we collect, use, and protect your personal information."
            }
            LegalPage::Terms => {
                "Terms of Service for our mobile pet grooming directory. Understand the terms and conditions for using our website."
            }
            LegalPage::Contact => {
                "Contact our mobile pet grooming directory with questions, suggestions, or business listing requests."
            }
            LegalPage::About => {
                "Our mission to connect pet owners with professional mobile grooming services."
            }
        }
    }
}

const LEGAL_STYLE: &str = r#"        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; margin: 0; padding: 20px; background: #f8f9fa; }
        .container { max-width: 800px; margin: 0 auto; background: white; padding: 40px; border-radius: 15px; box-shadow: 0 4px 20px rgba(0,0,0,0.1); }
        h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 15px; }
        h2 { color: #34495e; margin-top: 30px; }
        .update-date, .contact-box { background: #e8f5e8; padding: 15px; border-radius: 8px; margin-bottom: 30px; }
        .highlight-box { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 25px; border-radius: 10px; margin: 25px 0; }"#;

/// Host part of the base URL, used for contact addresses.
fn domain(context: &RenderContext) -> &str {
    let without_scheme = context
        .base_url
        .split_once("://")
        .map_or(context.base_url.as_str(), |(_, rest)| rest);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}

fn privacy_body(site: &str, updated: &str) -> String {
    format!(
        r#"        <div class="update-date">
            <strong>Last Updated:</strong> {updated}
        </div>

        <h2>Information We Collect</h2>
        <p>{site} ("we," "our," or "us") operates as a directory of mobile pet grooming services.</p>
        <h3>Business Information</h3>
        <p>We collect publicly available business information including names, addresses, phone numbers, hours of operation, and customer reviews from public sources such as map listings and business websites.</p>
        <h3>Website Usage Data</h3>
        <p>We may collect information about how you use our website, including your IP address, browser type, pages visited, and time spent on our site through cookies and similar technologies.</p>

        <h2>How We Use Information</h2>
        <ul>
            <li>Provide accurate business directory listings</li>
            <li>Improve our website functionality and user experience</li>
            <li>Display relevant advertisements</li>
            <li>Comply with legal obligations</li>
        </ul>

        <h2>Information Sharing</h2>
        <p>We do not sell, trade, or otherwise transfer your personal information to third parties except to display publicly available business information, with advertising partners for relevant ad display, or when required by law.</p>

        <h2>Cookies and Tracking</h2>
        <p>Our website uses cookies to enhance user experience and display relevant advertisements. You can control cookie settings through your browser preferences.</p>

        <h2>Your Rights</h2>
        <p>You may request access to, correction of, or deletion of information we hold about you.</p>

        <h2>Contact Us</h2>
        <p>If you have questions about this Privacy Policy, please visit <a href="/contact">our contact page</a>.</p>"#
    )
}

fn terms_body(site: &str, updated: &str) -> String {
    format!(
        r#"        <div class="update-date">
            <strong>Last Updated:</strong> {updated}
        </div>

        <h2>Acceptance of Terms</h2>
        <p>By accessing and using {site} ("the Website"), you accept and agree to be bound by the terms and provision of this agreement.</p>

        <h2>Disclaimer</h2>
        <p>The information on this website is provided on an 'as is' basis. To the fullest extent permitted by law, {site} excludes all representations, warranties, conditions and terms.</p>

        <h2>Business Listings</h2>
        <p>Business information is collected from public sources. We strive for accuracy but cannot guarantee the completeness or accuracy of all information. Users should verify business details directly with service providers.</p>

        <h2>User Responsibilities</h2>
        <ul>
            <li>Use the website lawfully and appropriately</li>
            <li>Not attempt to compromise website security</li>
            <li>Verify business information independently</li>
        </ul>

        <h2>Limitation of Liability</h2>
        <p>{site} shall not be held liable for any damages arising from the use of this website or the services listed herein.</p>

        <h2>Contact Information</h2>
        <p>Questions about the Terms of Service can be sent through <a href="/contact">our contact page</a>.</p>"#
    )
}

fn contact_body(site: &str, domain: &str) -> String {
    format!(
        r#"        <p>Have questions about our mobile pet grooming directory? Need to update business information? We'd love to hear from you!</p>

        <div class="contact-box">
            <h3>📧 General Inquiries</h3>
            <p>For general questions about our directory service, email <strong>info@{domain}</strong></p>
            <h3>🏢 Business Listings</h3>
            <p>Mobile grooming business owners who want to update their listing can contact <strong>listings@{domain}</strong></p>
            <h3>🔒 Privacy Concerns</h3>
            <p>For privacy-related questions or data removal requests, email <strong>privacy@{domain}</strong></p>
        </div>

        <h2>Response Time</h2>
        <p>{site} typically responds to all inquiries within 2-3 business days.</p>"#
    )
}

fn about_body(site: &str) -> String {
    format!(
        r#"        <div class="highlight-box">
            <h2>Our Mission</h2>
            <p>To connect pet owners with professional, convenient mobile grooming services in their local area, making pet care more accessible and stress-free for both pets and their families.</p>
        </div>

        <h2>What We Do</h2>
        <p>{site} is a directory of mobile pet grooming services. We research and compile information about professional mobile groomers who bring salon-quality services directly to your home.</p>

        <h2>Why Mobile Grooming?</h2>
        <ul>
            <li><strong>Reduced Stress:</strong> Pets remain in familiar surroundings</li>
            <li><strong>Convenience:</strong> No travel time or waiting rooms</li>
            <li><strong>Personalized Attention:</strong> One-on-one care for your pet</li>
            <li><strong>Safety:</strong> No exposure to other animals or illnesses</li>
        </ul>

        <h2>For Business Owners</h2>
        <p>If you operate a mobile pet grooming service and would like to update your listing, please <a href="/contact">contact us</a>.</p>"#
    )
}

pub fn render_legal_page(page: LegalPage, context: &RenderContext) -> String {
    let site = escape(&context.site_name);
    let updated = context.long_date();
    let content = match page {
        LegalPage::Privacy => privacy_body(&site, &updated),
        LegalPage::Terms => terms_body(&site, &updated),
        LegalPage::Contact => contact_body(&site, &escape(domain(context))),
        LegalPage::About => about_body(&site),
    };
    let heading = match page {
        LegalPage::About => format!("About {}", site),
        _ => page.heading().to_string(),
    };
    let body = format!(
        "    <div class=\"container\">\n        <h1>{heading}</h1>\n\n{content}\n\n        <p><a href=\"/\">← Back to Homepage</a></p>\n    </div>"
    );
    let title = format!("{} - {}", page.heading(), context.site_name);
    PageShell {
        title: &title,
        description: page.description(),
        canonical: context.url(&format!("/{}", page.slug())),
        json_ld: None,
        style: LEGAL_STYLE,
    }
    .wrap(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_context;

    #[test]
    fn test_domain_from_base_url() {
        assert_eq!(domain(&test_context()), "local-pet-grooming.com");
        let context = RenderContext::new("x", "http://localhost:8080/site", test_context().generated_on);
        assert_eq!(domain(&context), "localhost:8080");
    }

    #[test]
    fn test_every_page_links_home() {
        for page in LEGAL_PAGES {
            let html = render_legal_page(page, &test_context());
            assert!(html.contains("<a href=\"/\">← Back to Homepage</a>"), "{page:?}");
            assert!(
                html.contains(&format!(
                    "<link rel=\"canonical\" href=\"https://local-pet-grooming.com/{}\">",
                    page.slug()
                )),
                "{page:?}"
            );
        }
    }

    #[test]
    fn test_contact_page_uses_site_domain() {
        let html = render_legal_page(LegalPage::Contact, &test_context());
        assert!(html.contains("<strong>info@local-pet-grooming.com</strong>"));
        assert!(html.contains("<title>Contact Us - Local Pet Grooming</title>"));
    }

    #[test]
    fn test_about_heading_names_site() {
        let html = render_legal_page(LegalPage::About, &test_context());
        assert!(html.contains("<h1>About Local Pet Grooming</h1>"));
    }
}
