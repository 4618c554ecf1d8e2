//! Fraud lexicon: the declarative rule tables the scorer evaluates.
//!
//! Everything that tunes the scorer lives here as data: the weighted phrase
//! table, phrase-pair combination boosts, heuristic category term lists,
//! regex pattern sets, boost caps, and score floors. The scorer itself stays
//! a thin evaluator over these tables, so the rule set can be reviewed and
//! tested without touching scoring code.
//!
//! All phrases and terms are stored in normalized form (lowercase, no
//! punctuation besides apostrophes) because they are matched against the
//! normalized transcript.

use regex::Regex;

// ---------------------------------------------------------------------------
// Normalization and negation
// ---------------------------------------------------------------------------

/// How many characters before a match are searched for negation markers.
pub const NEGATION_WINDOW_CHARS: usize = 40;

/// Markers that negate a following match when found in the preceding window.
/// Trailing spaces keep "no " from matching inside ordinary words.
pub const NEGATION_MARKERS: &[&str] = &["not ", "never ", "don't ", "do not ", "did not ", "no "];

// ---------------------------------------------------------------------------
// Boost caps and floors
// ---------------------------------------------------------------------------

/// Cap on the summed phrase-pair combination boosts.
pub const COMBO_BOOST_CAP: i32 = 20;

/// Cap on the summed heuristic category boosts.
pub const HEURISTIC_BOOST_CAP: i32 = 70;

/// Floor when any explicit-scam term appears.
pub const FLOOR_EXPLICIT_SCAM: i32 = 90;

/// Floor when any hard-block term or pattern appears.
pub const FLOOR_HARD_BLOCK: i32 = 95;

/// Floor for exactly one matched critical keyword.
pub const FLOOR_SINGLE_CRITICAL: i32 = 75;

/// Floor for two or more matched critical keywords.
pub const FLOOR_MULTI_CRITICAL: i32 = 85;

/// Floor for at least one keyword match of any kind.
pub const FLOOR_ANY_MATCH: i32 = 60;

/// Floor for two keyword matches.
pub const FLOOR_TWO_MATCHES: i32 = 70;

/// Floor for three or more keyword matches.
pub const FLOOR_THREE_MATCHES: i32 = 80;

/// Floor when a payment-request or code-request hit is present.
pub const FLOOR_PAYMENT_OR_CODE_REQUEST: i32 = 70;

/// Floor when threat and account-access hits are simultaneously present.
pub const FLOOR_THREAT_AND_ACCOUNT_ACCESS: i32 = 80;

/// Floor when a donation/charity term is present.
pub const FLOOR_CHARITY: i32 = 60;

// ---------------------------------------------------------------------------
// Heuristic category tunables
// ---------------------------------------------------------------------------

/// Minimum hits and additive boost per heuristic category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub min_hits: u32,
    pub boost: i32,
}

pub const URGENCY_RULE: CategoryRule = CategoryRule {
    min_hits: 2,
    boost: 10,
};
pub const SECRECY_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 15,
};
pub const IMPERSONATION_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 10,
};
pub const PAYMENT_APP_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 10,
};
pub const CODE_REQUEST_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 15,
};
pub const EXPLICIT_SCAM_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 25,
};
pub const PAYMENT_REQUEST_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 15,
};
pub const HARD_BLOCK_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 30,
};
pub const THREAT_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 10,
};
pub const ACCOUNT_ACCESS_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 10,
};
pub const DOLLAR_AMOUNT_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 5,
};
pub const CHARITY_RULE: CategoryRule = CategoryRule {
    min_hits: 1,
    boost: 5,
};

/// Stacked boost when secrecy and payment-app hits co-occur.
pub const SECRECY_PAYMENT_APP_BOOST: i32 = 10;

/// Stacked boost when urgency and code-request hits co-occur.
pub const URGENCY_CODE_REQUEST_BOOST: i32 = 10;

/// Stacked boost when impersonation and payment-request hits co-occur.
pub const IMPERSONATION_PAYMENT_REQUEST_BOOST: i32 = 10;

/// Stacked boost when threat and dollar-amount hits co-occur.
pub const THREAT_DOLLAR_AMOUNT_BOOST: i32 = 10;

// ---------------------------------------------------------------------------
// Adjustment tunables
// ---------------------------------------------------------------------------

/// Points subtracted per matched safe phrase.
pub const SAFE_PHRASE_DAMPENING_PER_MATCH: i32 = 15;

/// Cap on total safe-phrase dampening.
pub const SAFE_PHRASE_DAMPENING_CAP: i32 = 45;

/// Caller-history window for the repeat-caller boost (days).
pub const REPEAT_CALLER_WINDOW_DAYS: u32 = 30;

/// Alert threshold used when the profile does not configure one.
pub const DEFAULT_ALERT_THRESHOLD: i32 = 90;

// ---------------------------------------------------------------------------
// Weighted phrase table
// ---------------------------------------------------------------------------

/// One entry in the weighted phrase table.
#[derive(Debug, Clone, Copy)]
pub struct WeightedPhrase {
    pub phrase: &'static str,
    pub weight: i32,
    /// Critical keywords trigger the critical-keyword floors on their own.
    pub critical: bool,
}

const fn phrase(phrase: &'static str, weight: i32) -> WeightedPhrase {
    WeightedPhrase {
        phrase,
        weight,
        critical: false,
    }
}

const fn critical(phrase: &'static str, weight: i32) -> WeightedPhrase {
    WeightedPhrase {
        phrase,
        weight,
        critical: true,
    }
}

static WEIGHTED_PHRASES: &[WeightedPhrase] = &[
    // Government and authority impersonation
    critical("irs", 35),
    critical("internal revenue service", 35),
    critical("social security number", 35),
    phrase("social security", 30),
    phrase("medicare", 25),
    critical("warrant", 30),
    critical("arrest", 30),
    phrase("lawsuit", 25),
    phrase("legal action", 25),
    phrase("police", 20),
    // Untraceable payment instruments
    critical("gift card", 40),
    critical("gift cards", 40),
    critical("itunes card", 40),
    critical("google play card", 40),
    critical("wire transfer", 40),
    critical("western union", 35),
    critical("moneygram", 35),
    critical("bitcoin atm", 40),
    phrase("bitcoin", 30),
    phrase("cryptocurrency", 30),
    phrase("prepaid card", 30),
    phrase("money order", 25),
    phrase("zelle", 25),
    phrase("venmo", 25),
    phrase("cash app", 25),
    phrase("paypal", 20),
    // Account and verification pressure
    critical("verify your account", 30),
    critical("account suspended", 35),
    phrase("suspended", 20),
    critical("verification code", 30),
    phrase("one time code", 30),
    phrase("security code", 25),
    phrase("pin number", 25),
    critical("routing number", 30),
    phrase("account number", 25),
    phrase("bank account", 20),
    phrase("suspicious activity", 25),
    phrase("unauthorized charges", 25),
    phrase("reactivate", 20),
    // Prize and lottery bait
    phrase("lottery", 30),
    phrase("sweepstakes", 30),
    critical("claim your prize", 35),
    phrase("you've won", 30),
    phrase("free prize", 30),
    // Urgency pressure
    phrase("immediately", 15),
    phrase("urgent", 15),
    phrase("act now", 20),
    phrase("final notice", 25),
    phrase("expires today", 20),
    phrase("last chance", 20),
    // Grandparent scam script
    phrase("grandson", 15),
    phrase("granddaughter", 15),
    critical("bail money", 35),
    phrase("in jail", 25),
    phrase("in trouble", 15),
    // Tech support scam script
    phrase("tech support", 25),
    critical("microsoft support", 30),
    phrase("computer virus", 30),
    critical("remote access", 30),
    phrase("refund department", 30),
    // Secrecy and self-identification
    critical("don't tell anyone", 30),
    phrase("keep this confidential", 25),
    phrase("scam", 25),
    phrase("fraud department", 25),
    // Charity pressure
    phrase("donation", 15),
    phrase("charity", 15),
];

// ---------------------------------------------------------------------------
// Combination boost rules
// ---------------------------------------------------------------------------

/// A phrase-pair co-occurrence boost. Both phrases must be matched
/// (non-negated) for the boost to apply.
#[derive(Debug, Clone, Copy)]
pub struct ComboRule {
    pub first: &'static str,
    pub second: &'static str,
    pub boost: i32,
}

const fn combo(first: &'static str, second: &'static str, boost: i32) -> ComboRule {
    ComboRule {
        first,
        second,
        boost,
    }
}

static COMBO_RULES: &[ComboRule] = &[
    combo("irs", "gift card", 10),
    combo("irs", "arrest", 10),
    combo("irs", "warrant", 10),
    combo("social security", "suspended", 10),
    combo("grandson", "bail money", 10),
    combo("granddaughter", "bail money", 10),
    combo("lottery", "gift card", 8),
    combo("sweepstakes", "claim your prize", 8),
    combo("tech support", "remote access", 10),
    combo("microsoft support", "remote access", 10),
    combo("verify your account", "verification code", 8),
    combo("wire transfer", "urgent", 8),
    combo("bank account", "suspended", 8),
];

// ---------------------------------------------------------------------------
// Heuristic category term lists
// ---------------------------------------------------------------------------

static URGENCY_TERMS: &[&str] = &[
    "immediately",
    "urgent",
    "urgently",
    "right away",
    "right now",
    "act now",
    "expires",
    "final notice",
    "last chance",
    "hurry",
    "deadline",
    "time sensitive",
];

static SECRECY_TERMS: &[&str] = &[
    "don't tell",
    "do not tell",
    "don't mention",
    "keep this between",
    "keep this confidential",
    "keep it secret",
    "tell no one",
    "our secret",
];

static IMPERSONATION_TERMS: &[&str] = &[
    "irs",
    "internal revenue service",
    "social security",
    "social security administration",
    "medicare",
    "microsoft",
    "apple support",
    "amazon support",
    "fbi",
    "federal agent",
    "sheriff",
    "police department",
    "fraud department",
    "tech support",
    "your bank",
    "customs",
];

static PAYMENT_APP_TERMS: &[&str] = &[
    "zelle",
    "venmo",
    "cash app",
    "cashapp",
    "paypal",
    "apple pay",
    "google pay",
];

static CODE_REQUEST_TERMS: &[&str] = &[
    "verification code",
    "one time code",
    "one time passcode",
    "security code",
    "confirmation code",
    "six digit code",
    "code i sent",
    "code we sent",
    "read me the code",
];

static EXPLICIT_SCAM_TERMS: &[&str] = &[
    "scam",
    "scams",
    "scammer",
    "scammers",
    "scamming",
    "phishing",
];

static HARD_BLOCK_TERMS: &[&str] = &[
    "gift card",
    "gift cards",
    "itunes card",
    "itunes cards",
    "google play card",
    "wire transfer",
    "western union",
    "moneygram",
    "bitcoin atm",
    "prepaid debit card",
];

static THREAT_TERMS: &[&str] = &[
    "arrest",
    "arrested",
    "warrant",
    "lawsuit",
    "sue you",
    "legal action",
    "jail",
    "prison",
    "deported",
    "deportation",
    "face charges",
];

static ACCOUNT_ACCESS_TERMS: &[&str] = &[
    "bank account",
    "account number",
    "routing number",
    "password",
    "pin number",
    "social security number",
    "remote access",
    "log into",
    "credit card number",
    "debit card number",
    "online banking",
];

static CHARITY_TERMS: &[&str] = &[
    "donation",
    "donations",
    "donate",
    "charity",
    "charitable",
    "fundraiser",
    "relief fund",
];

// ---------------------------------------------------------------------------
// Regex pattern sources
// ---------------------------------------------------------------------------

/// Payment-request phrasings too variable for fixed terms. Matched against
/// the normalized transcript.
static PAYMENT_REQUEST_PATTERNS: &[&str] = &[
    r"\b(?:send|wire|transfer)\b.{0,30}\b(?:money|cash|funds|payment)\b",
    r"\bpay\b.{0,30}\b(?:immediately|now|today|fine|fee|debt|taxes)\b",
    r"\b(?:buy|purchase|pick up)\b.{0,30}\bcards?\b",
    r"\bowe\b.{0,30}\b(?:money|taxes)\b",
    r"\bpayment\b.{0,30}\b(?:required|overdue|due)\b",
];

/// Hard-block patterns catching squeezed or spaced variants of the block
/// terms. Matched against the normalized transcript.
static HARD_BLOCK_PATTERNS: &[&str] = &[
    r"\bgift\s*cards?\b",
    r"\bwire\s+(?:transfer|money|funds)\b",
    r"\b(?:itunes|google play)\s+cards?\b",
    r"\bbitcoin\s+atm\b",
    r"\bwestern\s+union\b",
];

/// Dollar-amount patterns. Matched against the raw lowercased transcript
/// because normalization strips `$`.
static DOLLAR_AMOUNT_PATTERNS: &[&str] = &[
    r"\$\s*\d[\d,]*(?:\.\d+)?",
    r"\b\d[\d,]*\s+dollars\b",
    r"\b(?:hundred|thousand)\s+dollars\b",
];

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

/// The complete rule set consumed by the scorer.
///
/// Built once at startup via [`FraudLexicon::builtin`] and passed in
/// explicitly wherever scoring happens; there is no module-level lazy state.
pub struct FraudLexicon {
    pub phrases: &'static [WeightedPhrase],
    pub combos: &'static [ComboRule],
    pub urgency_terms: &'static [&'static str],
    pub secrecy_terms: &'static [&'static str],
    pub impersonation_terms: &'static [&'static str],
    pub payment_app_terms: &'static [&'static str],
    pub code_request_terms: &'static [&'static str],
    pub explicit_scam_terms: &'static [&'static str],
    pub hard_block_terms: &'static [&'static str],
    pub threat_terms: &'static [&'static str],
    pub account_access_terms: &'static [&'static str],
    pub charity_terms: &'static [&'static str],
    pub payment_request_patterns: Vec<Regex>,
    pub hard_block_patterns: Vec<Regex>,
    pub dollar_amount_patterns: Vec<Regex>,
}

impl FraudLexicon {
    /// Build the built-in rule set, compiling the regex pattern sets.
    pub fn builtin() -> Self {
        Self {
            phrases: WEIGHTED_PHRASES,
            combos: COMBO_RULES,
            urgency_terms: URGENCY_TERMS,
            secrecy_terms: SECRECY_TERMS,
            impersonation_terms: IMPERSONATION_TERMS,
            payment_app_terms: PAYMENT_APP_TERMS,
            code_request_terms: CODE_REQUEST_TERMS,
            explicit_scam_terms: EXPLICIT_SCAM_TERMS,
            hard_block_terms: HARD_BLOCK_TERMS,
            threat_terms: THREAT_TERMS,
            account_access_terms: ACCOUNT_ACCESS_TERMS,
            charity_terms: CHARITY_TERMS,
            payment_request_patterns: compile_all(PAYMENT_REQUEST_PATTERNS),
            hard_block_patterns: compile_all(HARD_BLOCK_PATTERNS),
            dollar_amount_patterns: compile_all(DOLLAR_AMOUNT_PATTERNS),
        }
    }
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
