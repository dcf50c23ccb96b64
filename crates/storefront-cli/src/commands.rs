//! Command handlers.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use storefront_core::models::{
    filter_products, CartResponse, CategoryResponse, ProductResponse, RegisterRequest,
};
use storefront_core::{ApiClient, Config, CurrencyClient};

use crate::format::{format_expiry, format_optional, format_price, format_rate, truncate_string};
use crate::Command;

/// Column width for product names in listings
const NAME_WIDTH: usize = 32;

/// Cart call that lowers a line by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecreaseAction {
    Decrease,
    Remove,
}

impl DecreaseAction {
    /// A line at quantity 1 (or less) is removed rather than taken to zero.
    fn for_quantity(quantity: i32) -> Self {
        if quantity <= 1 {
            DecreaseAction::Remove
        } else {
            DecreaseAction::Decrease
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    logged_in: bool,
    user_id: Option<i64>,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    minutes_left: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CategoryWithProducts<'a> {
    #[serde(flatten)]
    category: &'a CategoryResponse,
    products: Vec<&'a ProductResponse>,
}

pub struct App {
    config: Config,
    client: ApiClient,
    json: bool,
}

impl App {
    pub fn new(config: Config, client: ApiClient, json: bool) -> Self {
        Self {
            config,
            client,
            json,
        }
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Register {
                username,
                email,
                phone,
                address,
            } => self.register(username, email, phone, address).await,
            Command::Login { email } => self.login(email).await,
            Command::Logout => {
                self.client.logout();
                println!("Logged out.");
                Ok(())
            }
            Command::Status => self.status(),
            Command::Whoami => self.whoami().await,
            Command::Products { category, search } => self.products(category, &search).await,
            Command::Product { id } => self.product(id).await,
            Command::Categories => self.categories().await,
            Command::Catalog => self.catalog().await,
            Command::Cart => self.cart().await,
            Command::CartAdd {
                product_id,
                quantity,
            } => {
                self.require_login()?;
                self.client.add_to_cart(product_id, quantity).await?;
                self.cart().await
            }
            Command::CartIncrease { product_id } => {
                self.require_login()?;
                self.client.increase_quantity(product_id).await?;
                self.cart().await
            }
            Command::CartDecrease { product_id } => self.decrease(product_id).await,
            Command::CartRemove { product_id } => {
                self.require_login()?;
                self.client.remove_from_cart(product_id).await?;
                self.cart().await
            }
            Command::Rates {
                currencies,
                source,
                amount,
            } => self.rates(&currencies, &source, amount).await,
        }
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Fail early with a friendly message instead of a 401 from the server.
    fn require_login(&self) -> Result<()> {
        if !self.client.is_authenticated() {
            bail!("Not logged in (or the session expired). Run `storefront login` first.");
        }
        Ok(())
    }

    // ===== Account =====

    async fn register(
        &mut self,
        username: String,
        email: String,
        phone: String,
        address: String,
    ) -> Result<()> {
        let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
        let request = RegisterRequest {
            username,
            password,
            email,
            phone_number: phone,
            address,
        };

        let response = self.client.register(&request).await?;
        if self.json {
            return self.print_json(&response);
        }
        println!(
            "Registered {} (user #{}). You can now log in.",
            response.username, response.user_id
        );
        Ok(())
    }

    async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(email) => email,
            None => prompt_line("Email: ")?,
        };
        let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

        let response = self.client.login(&email, &password).await?;

        if let Err(e) = self.config.remember_email(&email) {
            warn!(error = %e, "Failed to save config");
        }

        if self.json {
            return self.print_json(&response);
        }
        let name = response.username.as_deref().unwrap_or("there");
        println!("Welcome, {}! Logged in as user #{}.", name, response.user_id);
        Ok(())
    }

    fn status(&self) -> Result<()> {
        let store = self.client.store();
        let session = store.session();
        let now = store.now();

        let report = StatusReport {
            logged_in: session.is_some(),
            user_id: session.as_ref().map(|s| s.user_id),
            expires_at: session.as_ref().map(|s| s.expires_at),
            minutes_left: session.as_ref().map(|s| s.minutes_until_expiry(now)),
        };

        if self.json {
            return self.print_json(&report);
        }
        match session {
            Some(s) => println!(
                "Logged in as user #{}. Session expires {}.",
                s.user_id,
                format_expiry(s.expires_at, s.minutes_until_expiry(now))
            ),
            None => println!("Not logged in."),
        }
        Ok(())
    }

    async fn whoami(&self) -> Result<()> {
        let Some(user) = self.client.fetch_current_user().await? else {
            bail!("Not logged in (or the session expired). Run `storefront login` first.");
        };

        if self.json {
            return self.print_json(&user);
        }
        println!("{} (#{})", user.username, user.user_id);
        println!("  Email:   {}", format_optional(&user.email, "-"));
        println!("  Phone:   {}", format_optional(&user.phone_number, "-"));
        println!("  Address: {}", format_optional(&user.address, "-"));
        println!("  Role:    {}", user.display_role());
        Ok(())
    }

    // ===== Catalog =====

    async fn products(&self, category: Option<i64>, search: &str) -> Result<()> {
        let products = self.client.fetch_products().await?;
        let filtered = filter_products(&products, category, search);
        debug!(total = products.len(), shown = filtered.len(), "Filtered products");

        if self.json {
            return self.print_json(&filtered);
        }
        if filtered.is_empty() {
            println!("No products found.");
        }
        for p in filtered {
            print_product_line(p);
        }
        Ok(())
    }

    async fn product(&self, id: i64) -> Result<()> {
        let product = self.client.fetch_product(id).await?;
        if self.json {
            return self.print_json(&product);
        }

        println!("{} (#{})", product.product_name, product.product_id);
        println!("  Price:    {}", format_price(product.price));
        println!("  Category: {}", product.category_name());
        if let Some(ref brief) = product.brief_description {
            println!("\n{}", brief);
        }
        if let Some(ref full) = product.full_description {
            println!("\n{}", full);
        }
        if let Some(ref specs) = product.technical_specifications {
            println!("\nSpecifications:\n{}", specs);
        }
        Ok(())
    }

    async fn categories(&self) -> Result<()> {
        let categories = self.client.fetch_categories().await?;
        if self.json {
            return self.print_json(&categories);
        }
        for c in &categories {
            println!("{:>5}  {}", c.category_id, c.category_name);
        }
        Ok(())
    }

    async fn catalog(&self) -> Result<()> {
        let (products, categories) = futures::try_join!(
            self.client.fetch_products(),
            self.client.fetch_categories()
        )?;

        let grouped: Vec<CategoryWithProducts> = categories
            .iter()
            .map(|category| CategoryWithProducts {
                category,
                products: filter_products(&products, Some(category.category_id), ""),
            })
            .collect();

        if self.json {
            return self.print_json(&grouped);
        }
        for group in &grouped {
            println!("{} ({})", group.category.category_name, group.products.len());
            for p in &group.products {
                print!("  ");
                print_product_line(p);
            }
        }
        Ok(())
    }

    // ===== Cart =====

    async fn cart(&self) -> Result<()> {
        self.require_login()?;
        let cart = self.client.fetch_cart().await?;
        if self.json {
            return self.print_json(&cart);
        }
        print_cart(&cart);
        Ok(())
    }

    async fn decrease(&self, product_id: i64) -> Result<()> {
        self.require_login()?;
        let cart = self.client.fetch_cart().await?;
        let Some(item) = cart.find_item(product_id) else {
            bail!("Product #{} is not in the cart", product_id);
        };

        match DecreaseAction::for_quantity(item.quantity) {
            DecreaseAction::Remove => self.client.remove_from_cart(product_id).await?,
            DecreaseAction::Decrease => self.client.decrease_quantity(product_id).await?,
        }
        self.cart().await
    }

    // ===== Currency =====

    async fn rates(&self, currencies: &str, source: &str, amount: Option<f64>) -> Result<()> {
        let client = CurrencyClient::from_config(&self.config)?;
        let quote = client.fetch_live(currencies, source).await?;

        if self.json {
            return self.print_json(&quote);
        }
        let mut pairs: Vec<(&String, &f64)> = quote.quotes.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        for (pair, rate) in pairs {
            println!("{}  {}", pair, format_rate(*rate));
        }

        if let Some(amount) = amount {
            for target in currencies
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
            {
                match quote.convert(amount, source, target) {
                    Some(converted) => println!(
                        "{} {} = {} {}",
                        format_rate(amount),
                        source.to_uppercase(),
                        format_rate(converted),
                        target.to_uppercase()
                    ),
                    None => println!(
                        "No rate for {}{}",
                        source.to_uppercase(),
                        target.to_uppercase()
                    ),
                }
            }
        }
        Ok(())
    }
}

fn print_product_line(p: &ProductResponse) {
    println!(
        "{:>5}  {:<width$}  {:>10}",
        p.product_id,
        truncate_string(&p.product_name, NAME_WIDTH),
        format_price(p.price),
        width = NAME_WIDTH
    );
}

fn print_cart(cart: &CartResponse) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in &cart.items {
        println!(
            "{:>5}  {:<width$}  {:>3} x {:>10}  {:>10}",
            item.product_id,
            truncate_string(&item.product_name, NAME_WIDTH),
            item.quantity,
            format_price(item.price),
            format_price(item.sub_total),
            width = NAME_WIDTH
        );
    }
    println!(
        "{} item(s), total {}{}",
        cart.item_count(),
        format_price(cart.total_price),
        cart.status
            .as_deref()
            .map(|s| format!(" [{}]", s))
            .unwrap_or_default()
    );
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}
