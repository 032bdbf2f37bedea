//! Presentation components for the tools the remote agent can call.
//!
//! Each [`ToolKind`] maps to a loading rendering and a final rendering built
//! from the tool's result payload.
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::errors::ToolError;

/// Tools with a registered presentation component.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ToolKind {
    #[serde(rename = "github-repo")]
    GithubRepo,
    #[serde(rename = "invoice-parser")]
    InvoiceParser,
    #[serde(rename = "weather-data")]
    WeatherData,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [Self::GithubRepo, Self::InvoiceParser, Self::WeatherData];

    /// Tag the remote agent uses for this tool.
    pub fn tag(self) -> &'static str {
        match self {
            Self::GithubRepo => "github-repo",
            Self::InvoiceParser => "invoice-parser",
            Self::WeatherData => "weather-data",
        }
    }

    /// Looks up a tool by its tag.
    pub fn from_tag(tag: &str) -> Result<Self, ToolError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| ToolError::UnknownKind(tag.to_string()))
    }

    /// Rendering shown while the tool runs.
    pub fn loading(self) -> ToolComponent {
        ToolComponent {
            kind: self,
            state: ToolState::Loading,
        }
    }

    /// Rendering shown once the tool returned `payload`.
    pub fn finalize(self, payload: Value) -> ToolComponent {
        let output = match self {
            Self::GithubRepo => typed(payload, ToolOutput::Github),
            Self::InvoiceParser => typed(payload, ToolOutput::Invoice),
            Self::WeatherData => typed(payload, ToolOutput::Weather),
        };
        ToolComponent {
            kind: self,
            state: ToolState::Final(output),
        }
    }
}

fn typed<T: serde::de::DeserializeOwned>(payload: Value, wrap: fn(T) -> ToolOutput) -> ToolOutput {
    match serde_json::from_value::<T>(payload.clone()) {
        Ok(value) => wrap(value),
        Err(_) => ToolOutput::Raw(payload),
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A tool's UI fragment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolComponent {
    pub kind: ToolKind,
    pub state: ToolState,
}

impl ToolComponent {
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ToolState::Loading)
    }

    /// Result payload as JSON, `None` while loading.
    pub fn payload(&self) -> Option<Value> {
        match &self.state {
            ToolState::Loading => None,
            ToolState::Final(output) => Some(output.to_value()),
        }
    }
}

impl fmt::Display for ToolComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            ToolState::Loading => write!(f, "[{}] loading...", self.kind),
            ToolState::Final(output) => write!(f, "{output}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ToolState {
    Loading,
    Final(ToolOutput),
}

/// Final tool payload, typed when it matches the tool's known shape.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ToolOutput {
    Github(GithubRepo),
    Invoice(Invoice),
    Weather(CurrentWeather),
    /// Payload that did not match the tool's shape (for example an error string).
    Raw(Value),
}

impl ToolOutput {
    pub fn to_value(&self) -> Value {
        let value = match self {
            Self::Github(repo) => serde_json::to_value(repo),
            Self::Invoice(invoice) => serde_json::to_value(invoice),
            Self::Weather(weather) => serde_json::to_value(weather),
            Self::Raw(value) => return value.clone(),
        };
        value.unwrap_or(Value::Null)
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Github(repo) => write!(f, "{repo}"),
            Self::Invoice(invoice) => write!(f, "{invoice}"),
            Self::Weather(weather) => write!(f, "{weather}"),
            Self::Raw(Value::String(text)) => f.write_str(text),
            Self::Raw(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GithubRepo {
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub language: Option<String>,
}

impl fmt::Display for GithubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}  ★ {}", self.owner, self.repo, self.stars)?;
        if let Some(language) = self.language.as_deref().filter(|l| !l.is_empty()) {
            write!(f, "  [{language}]")?;
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            write!(f, "\n{description}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub country: Option<String>,
    pub temperature: f64,
}

impl fmt::Display for CurrentWeather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.state)?;
        if let Some(country) = self.country.as_deref() {
            write!(f, ", {}", country.to_uppercase())?;
        }
        write!(f, ": {}°", self.temperature)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub order_id: String,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub customer_info: Option<CustomerInfo>,
    #[serde(default)]
    pub payment_info: Option<PaymentInfo>,
}

impl Invoice {
    /// Sum of quantity times unit price over all line items.
    pub fn total(&self) -> f64 {
        self.line_items
            .iter()
            .map(|item| item.quantity as f64 * item.price)
            .sum()
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invoice {}", self.order_id)?;
        if let Some(customer) = &self.customer_info {
            write!(f, " for {} <{}>", customer.name, customer.email)?;
        }
        for item in &self.line_items {
            write!(f, "\n  {} x{} @ {:.2}", item.name, item.quantity, item.price)?;
        }
        if let Some(address) = &self.shipping_address {
            write!(
                f,
                "\n  ship to: {}, {}, {}, {} {}",
                address.name, address.street, address.city, address.state, address.zip
            )?;
        }
        if let Some(payment) = &self.payment_info {
            write!(f, "\n  paid with {} ending {}", payment.card_type, payment.card_number_last_four)?;
        }
        write!(f, "\n  total: {:.2}", self.total())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub card_type: String,
    pub card_number_last_four: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_tag_is_an_error() {
        assert_eq!(
            ToolKind::from_tag("stock-quote"),
            Err(ToolError::UnknownKind("stock-quote".into()))
        );
        assert_eq!("weather-data".parse::<ToolKind>(), Ok(ToolKind::WeatherData));
    }

    #[test]
    fn weather_payload_is_typed_when_it_matches() {
        let component = ToolKind::WeatherData.finalize(json!({
            "city": "San Francisco", "state": "CA", "country": "usa", "temperature": 64
        }));
        let ToolState::Final(ToolOutput::Weather(weather)) = &component.state else {
            panic!("expected typed weather output, got {component:?}");
        };
        assert_eq!(weather.temperature, 64.0);
        assert_eq!(component.to_string(), "San Francisco, CA, USA: 64°");
    }

    #[test]
    fn mismatched_payload_is_kept_raw() {
        let component = ToolKind::WeatherData.finalize(json!({"temp": 72}));
        assert!(matches!(component.state, ToolState::Final(ToolOutput::Raw(_))));
        assert_eq!(component.payload(), Some(json!({"temp": 72})));
    }

    #[test]
    fn github_error_string_renders_verbatim() {
        let message = "There was an error fetching the repository.";
        let component = ToolKind::GithubRepo.finalize(json!(message));
        assert_eq!(component.to_string(), message);
    }

    #[test]
    fn invoice_total_sums_line_items() {
        let component = ToolKind::InvoiceParser.finalize(json!({
            "orderId": "A-1",
            "lineItems": [
                {"id": "1", "name": "Widget", "quantity": 2, "price": 3.5},
                {"id": "2", "name": "Gadget", "quantity": 1, "price": 10.0}
            ],
            "paymentInfo": {"cardType": "visa", "cardNumberLastFour": "4242"}
        }));
        let ToolState::Final(ToolOutput::Invoice(invoice)) = &component.state else {
            panic!("expected typed invoice output");
        };
        assert_eq!(invoice.total(), 17.0);
        assert!(component.to_string().contains("ending 4242"));
    }

    #[test]
    fn loading_component_has_no_payload() {
        let component = ToolKind::GithubRepo.loading();
        assert!(component.is_loading());
        assert_eq!(component.payload(), None);
        assert_eq!(component.to_string(), "[github-repo] loading...");
    }
}
