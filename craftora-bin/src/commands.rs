use crate::{
    captcha::Challenge,
    config::Config,
    translate::{detect_script_lang, Translator},
};
use anyhow::{bail, Context};
use craftora_db::{
    enums::{OrderStatus, ProductStatus, Role},
    feedbacks::Feedbacks,
    orders::{Cart, Order, OrderFinder, Orders, OrderStats},
    products::{IncompleteProduct, Product, ProductFinder, Products, UpdateProduct},
    store::Store,
    users::{ArtisanRequests, Artisans, Auth, Customers, Session},
};
use dialoguer::{Input, Password};
use rust_decimal::Decimal;
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Sign in. Solves a math captcha, then prompts for the password.
    Login { username: String, phone: String },
    /// Sign out and abandon the cart
    Logout,
    /// Show who is currently signed in
    Whoami,
    /// Create a customer account, or queue an artisan signup request
    Signup {
        #[structopt(long, default_value = "customer")]
        role: Role,
        username: String,
        phone: String,
    },
    /// Submit a product for consultant review
    Submit {
        #[structopt(long)]
        name: String,
        #[structopt(long)]
        price: Decimal,
        #[structopt(long = "image-url")]
        image_url: String,
        #[structopt(long)]
        description: String,
        /// Language the description was written in; it is translated to
        /// English before storing. Use "auto" to detect by script.
        #[structopt(long)]
        lang: Option<String>,
    },
    /// List your own products across both queues
    Products,
    /// Edit one of your products; it stays in whichever queue holds it
    Edit {
        id: String,
        #[structopt(long)]
        name: Option<String>,
        #[structopt(long)]
        price: Option<Decimal>,
        #[structopt(long = "image-url")]
        image_url: Option<String>,
        #[structopt(long)]
        description: Option<String>,
    },
    /// Delete one of your products
    Delete { id: String },
    /// The consultant panel
    Review(ReviewCommand),
    /// Browse the published catalog
    Catalog {
        /// Filter by name or id substring
        search: Option<String>,
    },
    /// Product details, with the description in a chosen language
    Describe {
        id: String,
        #[structopt(long, default_value = "original")]
        lang: String,
    },
    /// Manage the shopping cart
    Cart(CartCommand),
    /// Turn the cart into one order per artisan
    Checkout,
    /// The artisan order panel
    Orders(OrdersCommand),
    /// Aggregated order numbers (admin)
    Stats,
    /// Registered accounts (admin)
    Users(UsersCommand),
    /// Product feedback
    Feedback(FeedbackCommand),
}

#[derive(Debug, StructOpt)]
pub enum ReviewCommand {
    /// Products awaiting review
    Pending,
    /// Publish a pending product
    Approve { id: String },
    /// Move a pending product to the audit log
    Reject {
        id: String,
        #[structopt(long, default_value = "")]
        reason: String,
    },
    /// Artisan signup requests awaiting review
    Requests,
    /// Turn a signup request into an artisan account
    ApproveArtisan { id: String },
    RejectArtisan {
        id: String,
        #[structopt(long, default_value = "")]
        reason: String,
    },
    /// The rejection audit logs
    Rejected,
}

#[derive(Debug, StructOpt)]
pub enum CartCommand {
    /// Add a published product; the same name merges into one line
    Add {
        product_id: String,
        #[structopt(long, default_value = "1")]
        quantity: u32,
    },
    /// Drop a line by product name
    Remove { name: String },
    Show,
}

#[derive(Debug, StructOpt)]
pub enum OrdersCommand {
    /// Your orders, or everything with --all
    List {
        #[structopt(long)]
        all: bool,
    },
    /// placed -> processing -> delivered, one step at a time
    Advance { id: String, status: OrderStatus },
}

#[derive(Debug, StructOpt)]
pub enum UsersCommand {
    List,
    DeleteCustomer { id: String },
    DeleteArtisan { id: String },
}

#[derive(Debug, StructOpt)]
pub enum FeedbackCommand {
    /// Anyone may post, signed in or not
    Post { product_id: String, text: String },
    /// Feedback for one product
    List { product_id: String },
    /// Every feedback with its product and artisan resolved (admin view)
    Overview,
    /// Admin only
    Delete { id: String },
}

pub async fn run(command: Command, store: &Store, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Login { username, phone } => login(store, &username, &phone),
        Command::Logout => {
            Auth::logout(store)?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            match Session::current(store)? {
                Some(session) => println!("{} ({})", session.username, session.role),
                None => println!("Not signed in."),
            }
            Ok(())
        }
        Command::Signup {
            role,
            username,
            phone,
        } => signup(store, role, &username, &phone),
        Command::Submit {
            name,
            price,
            image_url,
            description,
            lang,
        } => submit(store, config, name, price, image_url, description, lang).await,
        Command::Products => my_products(store),
        Command::Edit {
            id,
            name,
            price,
            image_url,
            description,
        } => {
            let session = require_session(store)?;
            let update = UpdateProduct {
                name,
                price,
                image_url,
                description,
            };
            Products::update(store, &session, &id, update)?;
            println!("Product updated successfully.");
            Ok(())
        }
        Command::Delete { id } => {
            let session = require_session(store)?;
            Products::delete(store, &session, &id)?;
            println!("Product removed successfully.");
            Ok(())
        }
        Command::Review(review) => run_review(review, store),
        Command::Catalog { search } => catalog(store, search.as_deref()),
        Command::Describe { id, lang } => describe(store, config, &id, &lang).await,
        Command::Cart(cart) => run_cart(cart, store),
        Command::Checkout => {
            let created = Orders::checkout(store)?;
            println!("Order placed: {} order(s) created.", created.len());
            for id in created {
                println!("  #{}", id);
            }
            Ok(())
        }
        Command::Orders(orders) => run_orders(orders, store),
        Command::Stats => stats(store),
        Command::Users(users) => run_users(users, store),
        Command::Feedback(feedback) => run_feedback(feedback, store),
    }
}

fn require_session(store: &Store) -> anyhow::Result<Session> {
    Session::current(store)?.context("not signed in; use `login` first")
}

fn login(store: &Store, username: &str, phone: &str) -> anyhow::Result<()> {
    // The captcha gates authentication; a wrong or empty answer blocks the
    // attempt and a fresh challenge is generated.
    loop {
        let challenge = Challenge::generate();
        let answer: String = Input::new()
            .with_prompt(format!("Captcha {}", challenge.question()))
            .allow_empty(true)
            .interact_text()?;
        if challenge.verify(&answer) {
            break;
        }
        println!("Captcha incorrect. Please try again.");
    }

    let password = Password::new().with_prompt("Password").interact()?;
    let session = Auth::login(store, username, phone, &password)?;
    info!(role = %session.role, "login successful");
    println!("Login successful! Signed in as {} ({}).", session.username, session.role);
    Ok(())
}

fn signup(store: &Store, role: Role, username: &str, phone: &str) -> anyhow::Result<()> {
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;
    match role {
        Role::Customer => {
            Customers::register(store, username, phone, &password)?;
            println!("Customer signup successful. You can now login.");
        }
        Role::Artisan => {
            ArtisanRequests::submit(store, username, phone, &password)?;
            println!("Artisan signup request submitted. Consultant will review.");
        }
        _ => bail!("only customer and artisan accounts can sign up"),
    }
    Ok(())
}

async fn submit(
    store: &Store,
    config: &Config,
    name: String,
    price: Decimal,
    image_url: String,
    mut description: String,
    lang: Option<String>,
) -> anyhow::Result<()> {
    let session = require_session(store)?;

    // Descriptions written in another language are stored in English, the
    // way the dictation flow of the original did it.
    if let Some(lang) = lang {
        let source = if lang == "auto" {
            detect_script_lang(&description).unwrap_or("auto")
        } else {
            lang.as_str()
        };
        if source != "en" {
            description = Translator::new(&config.translation)
                .translate(&description, source, "en")
                .await;
        }
    }

    let incomplete = IncompleteProduct::new(name, price, image_url, description)?;
    let id = Products::submit(store, &session, incomplete)?;
    println!("Product submitted for review by consultant (id {}).", id);
    Ok(())
}

fn print_product(product: &Product) {
    println!(
        "  [{}] {} — ₹{}  (id {}, artisan {})",
        match product.get_status() {
            ProductStatus::Pending => "pending",
            ProductStatus::Approved => "approved",
        },
        product.get_name(),
        product.get_price(),
        product.get_id(),
        product.get_artisan_id(),
    );
}

fn my_products(store: &Store) -> anyhow::Result<()> {
    let session = require_session(store)?;
    // approved first, then pending, like the artisan panel showed them
    let mut mine = ProductFinder::published(store)?.artisan(&session.id).search();
    mine.extend(ProductFinder::pending(store)?.artisan(&session.id).search());
    if mine.is_empty() {
        println!("No products added yet.");
        return Ok(());
    }
    println!("Existing products ({}):", mine.len());
    for product in &mine {
        print_product(product);
    }
    Ok(())
}

fn run_review(review: ReviewCommand, store: &Store) -> anyhow::Result<()> {
    let session = require_session(store)?;
    match review {
        ReviewCommand::Pending => {
            let pending = ProductFinder::pending(store)?.search();
            if pending.is_empty() {
                println!("No pending products to review.");
            }
            for product in &pending {
                print_product(product);
                println!("      {}", product.get_description());
            }
        }
        ReviewCommand::Approve { id } => {
            Products::approve(store, &session, &id)?;
            println!("Product approved and published.");
        }
        ReviewCommand::Reject { id, reason } => {
            Products::reject(store, &session, &id, reason)?;
            println!("Product rejected.");
        }
        ReviewCommand::Requests => {
            let requests = ArtisanRequests::list(store)?;
            if requests.is_empty() {
                println!("No artisan signup requests.");
            }
            for request in &requests {
                println!(
                    "  {} • {} • requested {}  (id {})",
                    request.get_username(),
                    request.get_phone(),
                    request.get_requested_at().format("%Y-%m-%d %H:%M"),
                    request.get_id(),
                );
            }
        }
        ReviewCommand::ApproveArtisan { id } => {
            let artisan_id = ArtisanRequests::approve(store, &session, &id)?;
            println!("Artisan approved (account id {}).", artisan_id);
        }
        ReviewCommand::RejectArtisan { id, reason } => {
            ArtisanRequests::reject(store, &session, &id, reason)?;
            println!("Artisan request rejected.");
        }
        ReviewCommand::Rejected => {
            for entry in Products::rejected(store)? {
                println!(
                    "  product {} — {} ({})",
                    entry.get_product().get_name(),
                    entry.get_reason(),
                    entry.get_rejected_at().format("%Y-%m-%d %H:%M"),
                );
            }
            for entry in ArtisanRequests::rejected(store)? {
                println!(
                    "  artisan {} — {} ({})",
                    entry.get_request().get_username(),
                    entry.get_reason(),
                    entry.get_rejected_at().format("%Y-%m-%d %H:%M"),
                );
            }
        }
    }
    Ok(())
}

fn catalog(store: &Store, search: Option<&str>) -> anyhow::Result<()> {
    let mut finder = ProductFinder::published(store)?;
    if let Some(term) = search {
        finder = finder.name_or_id_contains(term);
    }
    let products = finder.search();
    if products.is_empty() {
        println!("No products available.");
        return Ok(());
    }
    for product in &products {
        println!(
            "  {} — ₹{}  (id {})",
            product.get_name(),
            product.get_price(),
            product.get_id()
        );
    }
    Ok(())
}

async fn describe(store: &Store, config: &Config, id: &str, lang: &str) -> anyhow::Result<()> {
    let product = ProductFinder::published(store)?.id(id).first()?;
    let artisan = Artisans::find_by_id(store, product.get_artisan_id())
        .map(|a| a.get_username().to_string())
        .unwrap_or_else(|_| product.get_artisan_id().to_string());
    println!("{} — ₹{}", product.get_name(), product.get_price());
    println!("Product ID: {} • By: {}", product.get_id(), artisan);

    let description = if lang == "original" {
        product.get_description().to_string()
    } else {
        Translator::new(&config.translation)
            .translate(product.get_description(), "auto", lang)
            .await
    };
    println!("{}", description);

    let feedbacks = Feedbacks::for_product(store, product.get_id())?;
    if !feedbacks.is_empty() {
        println!("Customer feedback:");
        for feedback in &feedbacks {
            println!(
                "  {} ({}): {}",
                feedback.get_author_name(),
                feedback.get_date().format("%Y-%m-%d %H:%M"),
                feedback.get_text()
            );
        }
    }
    Ok(())
}

fn run_cart(cart: CartCommand, store: &Store) -> anyhow::Result<()> {
    match cart {
        CartCommand::Add {
            product_id,
            quantity,
        } => {
            let product = ProductFinder::published(store)?.id(&product_id).first()?;
            Cart::add(store, &product, quantity)?;
            println!("{} added to cart!", product.get_name());
        }
        CartCommand::Remove { name } => {
            Cart::remove(store, &name)?;
            println!("Removed.");
        }
        CartCommand::Show => {
            let items = Cart::items(store)?;
            if items.is_empty() {
                println!("Your cart is empty.");
                return Ok(());
            }
            for item in &items {
                println!(
                    "  {} — qty {} — ₹{}  [{}]",
                    item.get_name(),
                    item.get_quantity(),
                    item.get_price() * Decimal::from(item.get_quantity()),
                    item.get_image(),
                );
            }
            println!("Total: ₹{}", Cart::total(store)?);
        }
    }
    Ok(())
}

fn print_order(order: &Order) {
    println!(
        "  #{} [{}] {} — customer {} — total ₹{}",
        order.get_id(),
        order.get_status(),
        order.get_date().format("%Y-%m-%d %H:%M"),
        order.get_customer_id().unwrap_or("unknown"),
        order.total(),
    );
    for item in order.get_items() {
        println!("      {} qty {} • ₹{}", item.get_name(), item.get_quantity(), item.get_price());
    }
}

fn run_orders(orders: OrdersCommand, store: &Store) -> anyhow::Result<()> {
    match orders {
        OrdersCommand::List { all } => {
            let session = require_session(store)?;
            let list = if all {
                OrderFinder::list(store)?
            } else {
                OrderFinder::new(store)?.artisan(&session.id).search()
            };
            if list.is_empty() {
                println!("No orders for you yet.");
            }
            for order in &list {
                print_order(order);
            }
        }
        OrdersCommand::Advance { id, status } => {
            let session = require_session(store)?;
            Orders::advance(store, &session, &id, status)?;
            println!("Order {} marked {}.", id, status);
        }
    }
    Ok(())
}

fn stats(store: &Store) -> anyhow::Result<()> {
    let session = require_session(store)?;
    if session.role != Role::Admin {
        bail!("the dashboard is only available to the admin");
    }
    let stats = OrderStats::compute(store)?;
    println!("Total orders:        {}", stats.total_orders);
    println!("Total revenue:       ₹{}", stats.total_revenue);
    println!("Average order value: ₹{}", stats.average_order_value);
    println!(
        "Registered users:    {} customers, {} artisans",
        Customers::list(store)?.len(),
        Artisans::list(store)?.len(),
    );
    if !stats.per_artisan.is_empty() {
        println!("Revenue by artisan:");
        for (artisan, per) in &stats.per_artisan {
            println!("  {} — orders: {}, revenue: ₹{}", artisan, per.orders, per.revenue);
        }
    }
    Ok(())
}

fn run_users(users: UsersCommand, store: &Store) -> anyhow::Result<()> {
    let session = require_session(store)?;
    match users {
        UsersCommand::List => {
            println!("Customers:");
            for customer in Customers::list(store)? {
                println!(
                    "  {} • {} • {}",
                    customer.get_username(),
                    customer.get_phone(),
                    customer.get_id()
                );
            }
            println!("Artisans:");
            for artisan in Artisans::list(store)? {
                println!(
                    "  {} • {} • {} • approved {}",
                    artisan.get_username(),
                    artisan.get_phone(),
                    artisan.get_id(),
                    artisan.get_approved_at().format("%Y-%m-%d"),
                );
            }
        }
        UsersCommand::DeleteCustomer { id } => {
            Customers::delete_by_id(store, &session, &id)?;
            println!("Customer deleted.");
        }
        UsersCommand::DeleteArtisan { id } => {
            Artisans::delete_by_id(store, &session, &id)?;
            println!("Artisan deleted.");
        }
    }
    Ok(())
}

fn run_feedback(feedback: FeedbackCommand, store: &Store) -> anyhow::Result<()> {
    match feedback {
        FeedbackCommand::Post { product_id, text } => {
            let session = Session::current(store)?;
            Feedbacks::post(store, session.as_ref(), &product_id, &text)?;
            println!("Feedback submitted. Thank you!");
        }
        FeedbackCommand::List { product_id } => {
            let list = Feedbacks::for_product(store, &product_id)?;
            if list.is_empty() {
                println!("No feedback yet.");
            }
            for entry in &list {
                println!(
                    "  {} ({}): {}",
                    entry.get_author_name(),
                    entry.get_date().format("%Y-%m-%d %H:%M"),
                    entry.get_text()
                );
            }
        }
        FeedbackCommand::Overview => {
            for view in Feedbacks::admin_view(store)? {
                println!(
                    "  {} (by {}) — {}: {}",
                    view.product_name,
                    view.artisan_name,
                    view.feedback.get_author_name(),
                    view.feedback.get_text()
                );
            }
        }
        FeedbackCommand::Delete { id } => {
            let session = require_session(store)?;
            Feedbacks::delete_by_id(store, &session, &id)?;
            println!("Feedback deleted.");
        }
    }
    Ok(())
}
