//! Static rider knowledge: rules, priority codes and the roster

use once_cell::sync::Lazy;

/// A rider rule topic
#[derive(Debug, Clone)]
pub struct Rule {
    pub topic: &'static str,
    /// Lowercase substrings that select this rule
    pub keywords: &'static [&'static str],
    pub content: &'static str,
}

impl Rule {
    /// Case-insensitive substring match against any keyword
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k))
    }
}

/// A priority code and what it entitles a rider to
#[derive(Debug, Clone)]
pub struct PriorityCode {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// A named group of roster entries
#[derive(Debug, Clone)]
pub struct RosterBucket {
    pub title: &'static str,
    pub entries: &'static [&'static str],
}

/// All lookup tables, immutable after load
#[derive(Debug)]
pub struct KnowledgeBase {
    pub rules: Vec<Rule>,
    pub priority_codes: Vec<PriorityCode>,
    pub roster: Vec<RosterBucket>,
}

impl KnowledgeBase {
    /// First rule, in list order, with a keyword contained in `text`
    pub fn find_rule(&self, text: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(text))
    }

    /// First rule whose topic name appears in `text`
    pub fn find_rule_by_topic(&self, text: &str) -> Option<&Rule> {
        let text = text.to_lowercase();
        self.rules
            .iter()
            .find(|r| text.contains(&r.topic.to_lowercase()))
    }

    /// 1-based lookup, matching the numbered topic menu
    pub fn rule_at(&self, position: usize) -> Option<&Rule> {
        position.checked_sub(1).and_then(|i| self.rules.get(i))
    }
}

pub static KNOWLEDGE: Lazy<KnowledgeBase> = Lazy::new(|| KnowledgeBase {
    rules: vec![
        Rule {
            topic: "Pass Selection",
            keywords: &["select", "pick", "choose", "expiration", "valid", "last minute"],
            content: "🎫 **Pass Selection**:\n\
                • Choose a pass number and check the expiration date.\n\
                • Only select if you plan to travel in the **next 6 months**.\n\
                • For last-minute requests, contact the Admin in the chat!",
        },
        Rule {
            topic: "Pass Limits & Reset",
            keywords: &["limit", "reset", "how many", "quota", "april", "october", "june", "december"],
            content: "📉 **Pass Limits**:\n\
                • Riders choose **1-2 passes** every 6 months (June & December), depending on status.\n\
                • **Reset**: Counts reset every **April & October**.\n\
                • Unused/unplanned passes are withdrawn by the admin upon reset.",
        },
        Rule {
            topic: "Usage & Trading",
            keywords: &["use", "trade", "sell", "group", "transfer", "gift", "grabs"],
            content: "🤝 **Usage & Trading**:\n\
                • Passes are for **\"B6 Rider\" group members only**.\n\
                • Passes can be traded or put up for grabs (Max price: **$35**).\n\
                • **Up for Grabs**: Tickets must be posted 30 days before expiration.\n\
                • **Redemption**: All passes are eligible for redemption by any rider 30 days out from expiration.\n\
                • To gift outside the group, send a private note to the Admin.",
        },
        Rule {
            topic: "Raffles",
            keywords: &["raffle", "random", "win", "prize"],
            content: "🎟️ **Raffles**:\n\
                • One random buddy pass will be raffled amongst all pass riders periodically.\n\
                • Pop-up raffles may happen for unused passes!",
        },
        Rule {
            topic: "Costs & Fees",
            keywords: &["cost", "price", "fee", "tax", "bitcoin", "crypto", "pay"],
            content: "💸 **Pass Rider Costs (Taxes & Fees)**:\n\n\
                🇺🇸 **Domestic (USA)**:\n\
                • $80 - $160 (Includes $40-$60 service fee)\n\n\
                🌍 **International**:\n\
                • $150 - $350 (Includes $40-$60 service fee)\n\n\
                💳 **Payment Methods**:\n\
                USD, Bitcoin, Ethereum, Polygon, USDC.\n\n\
                *All Passes are Subject To Service Fees.*",
        },
        Rule {
            topic: "General Info",
            keywords: &["standby", "website", "seat", "check", "jetblue"],
            content: "ℹ️ **General Info**:\n\
                • All flights are **STANDBY** on JetBlue Airways (B6) only.\n\
                • Check destinations at [www.jetblue.com](https://www.jetblue.com).\n\
                • Text in the chat if you need a seat availability check.",
        },
    ],
    priority_codes: vec![
        PriorityCode {
            code: "S6.STND1",
            name: "Standard Riders",
            description: "Eligible for [1] buddy pass every 6 months.",
        },
        PriorityCode {
            code: "S6.PRM2",
            name: "Premium Riders",
            description: "Eligible for [2] buddy passes every 6 months.",
        },
        PriorityCode {
            code: "S6+",
            name: "Additional",
            description: "Eligible for [1] buddy pass every 12 months.",
        },
        PriorityCode {
            code: "RG - S6+",
            name: "Registered Guest",
            description: "Unlimited rides on CM benefits.",
        },
        PriorityCode {
            code: "CLI+",
            name: "Partnership / Clients",
            description: "Allocated # of passes as part of group contract/terms.",
        },
    ],
    roster: vec![
        RosterBucket {
            title: "Current Riders",
            entries: &[
                "1. Malcolm M. (Companion S5) / S6+ (1 yearly)",
                "2. Gilly A. / S6.STND1",
                "3. Lakim D. / RG - S6+",
                "4. Jiggy M. / S6.PRM2",
                "5. Rontez V. / S6.STND1",
                "6. Simone S. / S6.STND1",
                "7. Ryan (uncle) / S6.PRM2",
                "8. Lauren (sister) / S6.PRM2",
                "9. Darius B. / CLI+",
                "10. Carl S. / S6.STND1",
                "11. Sena H. / S6.STND1",
                "12. Jaime H. (cousin) / RG - S6+",
                "13. Molly O. / S6.STND1",
                "14. Pedro V. / S6.STND1",
                "15. Brady V. / S6.STND1",
                "16. Lionel T. / S6.STND1",
                "17. Sena H. / S6.STND1",
                "18. Karen E. / S6.STND1",
                "19. Jimmy T. / S6.PRM2",
                "20. Ashley W. (cousin) / S6.PRM2",
            ],
        },
        RosterBucket {
            title: "Unlisted",
            entries: &[
                "1. Kim B. (sister unlisted) / S6.PRM2",
                "2. Wendy T. (aunt unlisted) / S6+ (1 yearly)",
                "3. Daisean R. / S6.PRM2",
                "4. Kayvon R. / S6.PRM2",
                "5. Tad W. / S6.PRM2",
                "6. Tad W. / S6.PRM2",
                "7. Steve O. / S6.STND1",
                "8. Thifa T. / S6.STND1",
            ],
        },
        RosterBucket {
            title: "DMG Group",
            entries: &[
                "* Jiggy M. / S6.PRM2",
                "* Brady V. / S6+ (on request)",
                "* Bryan C. / S6+ (on request)",
                "* Chris S. / S6+ (on request)",
                "* Domo W. / S6+ (on request)",
                "* Molly O. / S6.STND1",
                "* Keana T. / S6+ (on request)",
            ],
        },
    ],
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_resolves_to_its_topic() {
        for rule in &KNOWLEDGE.rules {
            for keyword in rule.keywords {
                let text = format!("Quick question about {}?", keyword.to_uppercase());
                let found = KNOWLEDGE.find_rule(&text).expect("keyword should match");
                // an earlier rule may also claim the text; first match wins
                let first = KNOWLEDGE.rules.iter().position(|r| r.matches(&text)).unwrap();
                assert_eq!(found.topic, KNOWLEDGE.rules[first].topic);
                assert!(first <= KNOWLEDGE.rules.iter().position(|r| r.topic == rule.topic).unwrap());
            }
        }
    }

    #[test]
    fn test_first_match_wins_on_ties() {
        // "pick" belongs to Pass Selection, "fee" to Costs & Fees
        let rule = KNOWLEDGE.find_rule("can I pick one and what is the fee").unwrap();
        assert_eq!(rule.topic, "Pass Selection");
    }

    #[test]
    fn test_no_keyword_no_rule() {
        assert!(KNOWLEDGE.find_rule("good morning everyone").is_none());
    }

    #[test]
    fn test_rule_at_is_one_based() {
        assert_eq!(KNOWLEDGE.rule_at(1).unwrap().topic, "Pass Selection");
        assert_eq!(KNOWLEDGE.rule_at(6).unwrap().topic, "General Info");
        assert!(KNOWLEDGE.rule_at(0).is_none());
        assert!(KNOWLEDGE.rule_at(7).is_none());
    }

    #[test]
    fn test_topic_lookup_ignores_case() {
        let rule = KNOWLEDGE.find_rule_by_topic("tell me about raffles").unwrap();
        assert_eq!(rule.topic, "Raffles");
    }
}
