//! The fixed company corpus ranked by the recommender.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketSize {
    Small,
    Medium,
    Large,
}

impl fmt::Display for MarketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketSize::Small => "Small",
            MarketSize::Medium => "Medium",
            MarketSize::Large => "Large",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub name: &'static str,
    pub industry: &'static str,
    /// Total funding in millions of USD
    pub funding_millions: u32,
    pub market_size: MarketSize,
}

impl Company {
    /// Text fed to the vectorizer: industry first, then name
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.industry, self.name)
    }

    /// Funding as displayed to clients, e.g. `"282 million"`
    pub fn funding_magnitude(&self) -> String {
        format!("{} million", self.funding_millions)
    }
}

const fn company(
    name: &'static str,
    industry: &'static str,
    funding_millions: u32,
    market_size: MarketSize,
) -> Company {
    Company {
        name,
        industry,
        funding_millions,
        market_size,
    }
}

pub static COMPANIES: [Company; 57] = [
    company("Swvl", "Transport", 197, MarketSize::Large),
    company("Fawry", "Digital Payments", 470, MarketSize::Large),
    company("Vezeeta", "Healthcare", 296, MarketSize::Medium),
    company("Trella", "Logistics", 197, MarketSize::Medium),
    company("MaxAB", "E-commerce", 188, MarketSize::Large),
    company("Almentor", "E-learning", 282, MarketSize::Medium),
    company("Education Hub", "E-learning", 329, MarketSize::Medium),
    company("Ebtikar", "Fintech", 705, MarketSize::Large),
    company("Paymob", "Fintech", 846, MarketSize::Large),
    company("City Edge", "Real Estate", 658, MarketSize::Large),
    company("Misr City Housing", "Real Estate", 470, MarketSize::Large),
    company("Swedy Electric", "Industry & Energy", 188, MarketSize::Medium),
    company("Talaat Moustafa Group", "Real Estate", 517, MarketSize::Large),
    company("National Bank of Egypt", "Banking", 470, MarketSize::Large),
    company("Banque Misr", "Banking", 470, MarketSize::Large),
    company("Commercial International Bank", "Banking", 564, MarketSize::Large),
    company("A15", "Venture Capital", 282, MarketSize::Medium),
    company("Endeavor Egypt", "Venture Capital", 282, MarketSize::Medium),
    company("Sawari Ventures", "Venture Capital", 235, MarketSize::Medium),
    company("Flat6Labs", "Venture Capital", 188, MarketSize::Medium),
    company("Qudra", "Fintech", 47, MarketSize::Small),
    company("Shezlong", "Healthcare", 470, MarketSize::Medium),
    company("Instabug", "Tech", 235, MarketSize::Medium),
    company("Eventtus", "Tech", 188, MarketSize::Small),
    company("Cluep", "Tech", 141, MarketSize::Small),
    company("Elmenus", "E-commerce", 235, MarketSize::Medium),
    company("ElGouna", "Tourism", 517, MarketSize::Large),
    company("Orange Egypt", "Telecommunications", 1175, MarketSize::Large),
    company("Valeo Egypt", "Technology", 470, MarketSize::Large),
    company("Jumia Egypt", "E-commerce", 188, MarketSize::Large),
    company("Careem", "Transport", 235, MarketSize::Large),
    company("Uber Egypt", "Transport", 141, MarketSize::Large),
    company("Amazon Egypt", "E-commerce", 282, MarketSize::Large),
    company("ElAraby Group", "Retail", 213, MarketSize::Large),
    company("Seera Group", "Travel", 470, MarketSize::Medium),
    company("Tawarruq", "Fintech", 587, MarketSize::Medium),
    company("Cashfree", "Fintech", 611, MarketSize::Medium),
    company("Ally Invest", "Investment", 290, MarketSize::Medium),
    company("Fatura", "Fintech", 115, MarketSize::Small),
    company("Upwork Egypt", "Technology", 470, MarketSize::Large),
    company("Teady", "E-commerce", 705, MarketSize::Medium),
    company("Go Bus", "Transport", 752, MarketSize::Large),
    company("Dirb", "Transport", 611, MarketSize::Medium),
    company("Logistics Plus", "Logistics", 799, MarketSize::Medium),
    company("CargoX", "Logistics", 752, MarketSize::Medium),
    company("Shahiya", "E-commerce", 893, MarketSize::Medium),
    company("Ramsys", "Healthcare", 470, MarketSize::Medium),
    company("Shetab", "Fintech", 350, MarketSize::Medium),
    company("Infinity Media", "Advertising", 692, MarketSize::Medium),
    company("Platinum Real Estate", "Real Estate", 350, MarketSize::Medium),
    company("Reyada Group", "Real Estate", 820, MarketSize::Large),
    company("Carriage", "Food Delivery", 820, MarketSize::Medium),
    company("Zed", "Retail", 585, MarketSize::Medium),
    company("DriveMe", "Transport", 551, MarketSize::Medium),
    company("Taskty", "Technology", 564, MarketSize::Medium),
    company("Cook Door", "Food", 705, MarketSize::Medium),
    company("Aqarmap", "Real Estate", 541, MarketSize::Medium),
];

/// An owned copy of the corpus in its canonical order
pub fn companies() -> Vec<Company> {
    COMPANIES.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_corpus_shape() {
        assert_eq!(COMPANIES.len(), 57);
        let names: HashSet<&str> = COMPANIES.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), COMPANIES.len());
        assert_eq!(COMPANIES.iter().filter(|c| c.industry == "Fintech").count(), 7);
    }

    #[test]
    fn test_rendering() {
        let almentor = COMPANIES.iter().find(|c| c.name == "Almentor").unwrap();
        assert_eq!(almentor.combined_text(), "E-learning Almentor");
        assert_eq!(almentor.funding_magnitude(), "282 million");
        assert_eq!(almentor.market_size.to_string(), "Medium");
    }
}
