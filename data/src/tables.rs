//! Builtin data tables
//!
//! Destination and pattern data for the builtin target source. Malicious and
//! C2 entries use reserved or well-known test domains; none of them resolve
//! to infrastructure a dry-run-off operator could harm by accident.

/// Benign destinations for normal browsing simulation
pub(crate) const WEBSITES: &[&str] = &[
    // Search engines
    "https://www.google.com",
    "https://www.bing.com",
    "https://duckduckgo.com",
    "https://www.yahoo.com",
    "https://search.brave.com",
    "https://www.startpage.com",
    // Social media
    "https://www.facebook.com",
    "https://www.twitter.com",
    "https://www.instagram.com",
    "https://www.linkedin.com",
    "https://www.reddit.com",
    "https://www.pinterest.com",
    "https://www.tiktok.com",
    "https://www.discord.com",
    "https://www.threads.net",
    // Video and entertainment
    "https://www.youtube.com",
    "https://www.netflix.com",
    "https://www.twitch.tv",
    "https://vimeo.com",
    "https://www.hulu.com",
    "https://www.disneyplus.com",
    "https://www.crunchyroll.com",
    // News and media
    "https://www.cnn.com",
    "https://www.bbc.com",
    "https://www.reuters.com",
    "https://www.nytimes.com",
    "https://www.washingtonpost.com",
    "https://www.theguardian.com",
    "https://www.npr.org",
    "https://www.bloomberg.com",
    "https://news.ycombinator.com",
    // E-commerce
    "https://www.amazon.com",
    "https://www.ebay.com",
    "https://www.walmart.com",
    "https://www.target.com",
    "https://www.bestbuy.com",
    "https://www.etsy.com",
    "https://www.aliexpress.com",
    "https://www.wayfair.com",
    // Technology
    "https://www.microsoft.com",
    "https://www.apple.com",
    "https://www.github.com",
    "https://stackoverflow.com",
    "https://www.techcrunch.com",
    "https://www.wired.com",
    "https://www.theverge.com",
    "https://www.arstechnica.com",
    "https://gitlab.com",
    // Cloud and productivity
    "https://aws.amazon.com",
    "https://cloud.google.com",
    "https://azure.microsoft.com",
    "https://www.dropbox.com",
    "https://drive.google.com",
    "https://www.notion.so",
    "https://slack.com",
    "https://zoom.us",
    "https://docs.google.com",
    // Education and knowledge
    "https://www.wikipedia.org",
    "https://www.coursera.org",
    "https://www.edx.org",
    "https://www.khanacademy.org",
    "https://www.udemy.com",
    "https://www.duolingo.com",
    // Entertainment and gaming
    "https://www.spotify.com",
    "https://www.imdb.com",
    "https://www.ign.com",
    "https://www.epicgames.com",
    "https://www.roblox.com",
    // Finance
    "https://www.paypal.com",
    "https://www.stripe.com",
    "https://www.coinbase.com",
    "https://www.chase.com",
    // Travel
    "https://www.booking.com",
    "https://www.expedia.com",
    "https://www.airbnb.com",
    "https://www.tripadvisor.com",
    "https://www.uber.com",
    // Health
    "https://www.webmd.com",
    "https://www.mayoclinic.org",
    "https://www.strava.com",
    // Weather and maps
    "https://weather.com",
    "https://www.accuweather.com",
    "https://maps.google.com",
    "https://www.openstreetmap.org",
    // Forums and communities
    "https://www.quora.com",
    "https://medium.com",
];

/// Malicious destinations for attack simulation
pub(crate) const MALICIOUS_DOMAINS: &[&str] = &[
    "http://malware-traffic-analysis.net",
    "http://testmyids.com",
    "http://eicar.org",
    "http://malicious.example",
    "http://phishing.example",
    "http://trojan.example",
    "http://botnet.example",
    "http://c2server.example",
    "http://ransomware.example",
    "http://exploit.example",
];

/// C2 server domains for beacon simulation
pub(crate) const C2_DOMAINS: &[&str] = &[
    "c2.evil.example",
    "command.malicious.example",
    "control.bad.example",
    "backdoor.example.com",
    "rat.controller.example",
    "beacon.attacker.example",
];

/// One attack-pattern family
pub(crate) struct AttackPatternDef {
    pub name: &'static str,
    pub payloads: &'static [&'static str],
    pub fields: &'static [&'static str],
}

/// Attack pattern families and their payload/field pools
pub(crate) const ATTACK_PATTERNS: &[AttackPatternDef] = &[
    AttackPatternDef {
        name: "sql_injection",
        payloads: &["' OR 1=1--", "'; DROP TABLE users;--", "admin'--"],
        fields: &["search", "login", "id", "query"],
    },
    AttackPatternDef {
        name: "xss",
        payloads: &[
            "<script>alert('XSS')</script>",
            "<img src=x onerror=alert(1)>",
        ],
        fields: &["comment", "search", "input", "name"],
    },
    AttackPatternDef {
        name: "directory_traversal",
        payloads: &["../../../etc/passwd", "..\\..\\..\\windows\\system32\\"],
        fields: &["file", "path", "dir", "include"],
    },
    AttackPatternDef {
        name: "command_injection",
        payloads: &["; cat /etc/passwd", "| whoami", "&& dir"],
        fields: &["cmd", "exec", "system", "shell"],
    },
];

/// One compromised-host behavior family
pub(crate) struct CompromiseBehaviorDef {
    pub name: &'static str,
    pub methods: &'static [&'static str],
    pub indicators: &'static [&'static str],
    /// Internal paths the behavior touches; empty for behaviors whose target
    /// is resolved specially (benign site, C2 domain, exfil host)
    pub target_paths: &'static [&'static str],
}

/// Compromised-host behavior families
pub(crate) const COMPROMISE_BEHAVIORS: &[CompromiseBehaviorDef] = &[
    CompromiseBehaviorDef {
        name: "credential_theft",
        methods: &["POST", "PUT"],
        indicators: &["password", "username", "email", "login"],
        target_paths: &[],
    },
    CompromiseBehaviorDef {
        name: "data_exfiltration",
        methods: &["POST", "PUT"],
        indicators: &["file", "data", "document", "export"],
        target_paths: &[],
    },
    CompromiseBehaviorDef {
        name: "lateral_movement",
        methods: &["GET", "POST"],
        indicators: &["scan", "enumerate", "discover"],
        target_paths: &["admin", "internal", "management", "control"],
    },
    CompromiseBehaviorDef {
        name: "persistence",
        methods: &["POST", "PUT", "PATCH"],
        indicators: &["install", "register", "create"],
        target_paths: &["config", "settings", "startup", "service"],
    },
    CompromiseBehaviorDef {
        name: "c2_communication",
        methods: &["GET", "POST"],
        indicators: &["beacon", "heartbeat", "check-in"],
        target_paths: &[],
    },
];

/// Host used as the destination marker for simulated exfiltration
pub(crate) const EXFIL_HOST: &str = "http://attacker-controlled.example";

/// Host prefix for simulated internal (lateral movement / persistence) targets
pub(crate) const INTERNAL_HOST: &str = "http://intranet.local";
