use crate::host::Console;
use crate::programs::{CallResult, Program};
use cshowcase::kernel::UnitValue;
use serde::Deserialize;

const SEED_FILE: &str = "inventory.json";
const RULE: &str = "----------------------------------------------------------";

#[derive(Debug, Clone, PartialEq)]
enum Details {
    Dimensions(i64, i64, i64),
    Description(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Product {
    name: String,
    quantity: i64,
    price: f64,
    details: Details,
}

#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    quantity: i64,
    price: f64,
    #[serde(default)]
    dimensions: Option<[i64; 3]>,
    #[serde(default)]
    description: String,
}

impl From<SeedProduct> for Product {
    fn from(seed: SeedProduct) -> Self {
        let details = match seed.dimensions {
            Some([l, w, h]) => Details::Dimensions(l, w, h),
            None => Details::Description(seed.description),
        };
        Product {
            name: seed.name,
            quantity: seed.quantity,
            price: seed.price,
            details,
        }
    }
}

#[derive(Debug, Default)]
struct Draft {
    name: String,
    quantity: i64,
    price: f64,
    dims: [i64; 3],
}

#[derive(Debug, Default)]
enum Step {
    #[default]
    Menu,
    AddName,
    AddQuantity(Draft),
    AddPrice(Draft),
    AddHasDimensions(Draft),
    AddLength(Draft),
    AddWidth(Draft),
    AddHeight(Draft),
    AddDescription(Draft),
    QuantityName,
    QuantityValue(String),
    PriceName,
    PriceValue(String),
    DeleteName,
}

#[derive(Debug, Default)]
pub struct Inventory {
    products: Vec<Product>,
    step: Step,
    active: bool,
}

impl Program for Inventory {
    fn exports(&self) -> &'static [&'static str] {
        &["init_inventory", "process_inventory_input"]
    }

    fn call(&mut self, console: &mut dyn Console, name: &str, args: &[UnitValue]) -> CallResult {
        match name {
            "init_inventory" => self.init(console),
            _ => self.input(console, crate::text_arg(args).trim()),
        }
        Ok(None)
    }
}

impl Inventory {
    fn init(&mut self, console: &mut dyn Console) {
        self.products = load_seed(console);
        self.active = true;
        self.step = Step::Menu;
        print_menu(console);
    }

    fn input(&mut self, console: &mut dyn Console, input: &str) {
        if !self.active {
            console.println(
                "Inventory session has ended. Please re-initialize to start a new session.",
            );
            return;
        }

        let step = std::mem::take(&mut self.step);
        self.step = match step {
            Step::Menu => self.menu_choice(console, input),
            Step::AddName => {
                let draft = Draft {
                    name: input.to_string(),
                    ..Draft::default()
                };
                console.println(&format!("Enter quantity for '{}': ", draft.name));
                Step::AddQuantity(draft)
            }
            Step::AddQuantity(mut draft) => {
                draft.quantity = atoi(input);
                console.println(&format!("Enter price for '{}': ", draft.name));
                Step::AddPrice(draft)
            }
            Step::AddPrice(mut draft) => {
                draft.price = atof(input);
                console.println(&format!(
                    "Does '{}' have dimensions (0 - No, 1 - Yes): ",
                    draft.name
                ));
                Step::AddHasDimensions(draft)
            }
            Step::AddHasDimensions(draft) => match atoi(input) {
                1 => {
                    console.println(&format!("Enter length for '{}': ", draft.name));
                    Step::AddLength(draft)
                }
                choice => {
                    if choice != 0 {
                        console.println("Invalid choice for dimensions. Assuming No (0).");
                    }
                    console.println(&format!(
                        "Enter product description for '{}': ",
                        draft.name
                    ));
                    Step::AddDescription(draft)
                }
            },
            Step::AddLength(mut draft) => {
                draft.dims[0] = atoi(input);
                console.println(&format!("Enter width for '{}': ", draft.name));
                Step::AddWidth(draft)
            }
            Step::AddWidth(mut draft) => {
                draft.dims[1] = atoi(input);
                console.println(&format!("Enter height for '{}': ", draft.name));
                Step::AddHeight(draft)
            }
            Step::AddHeight(mut draft) => {
                draft.dims[2] = atoi(input);
                let [l, w, h] = draft.dims;
                self.add(console, draft, Details::Dimensions(l, w, h));
                Step::Menu
            }
            Step::AddDescription(draft) => {
                self.add(console, draft, Details::Description(input.to_string()));
                Step::Menu
            }
            Step::QuantityName => self.find_then(console, input, |p| {
                format!(
                    "Enter new quantity for '{}' (current: {}): ",
                    p.name, p.quantity
                )
            })
            .map(Step::QuantityValue)
            .unwrap_or(Step::Menu),
            Step::QuantityValue(name) => {
                let quantity = atoi(input);
                self.update(console, &name, |p| {
                    p.quantity = quantity;
                    format!("Quantity for '{}' updated to {}.", p.name, p.quantity)
                });
                Step::Menu
            }
            Step::PriceName => self.find_then(console, input, |p| {
                format!("Enter new price for '{}' (current: {:.2}): ", p.name, p.price)
            })
            .map(Step::PriceValue)
            .unwrap_or(Step::Menu),
            Step::PriceValue(name) => {
                let price = atof(input);
                self.update(console, &name, |p| {
                    p.price = price;
                    format!("Price for '{}' updated to {:.2}.", p.name, p.price)
                });
                Step::Menu
            }
            Step::DeleteName => {
                match self.products.iter().position(|p| p.name == input) {
                    Some(idx) => {
                        self.products.remove(idx);
                        console.println(&format!("Product '{input}' deleted successfully!"));
                    }
                    None => console.println(&format!("Product '{input}' not found for deletion.")),
                }
                Step::Menu
            }
        };

        if matches!(self.step, Step::Menu) && self.active {
            console.println("Enter your choice:");
        }
    }

    fn menu_choice(&mut self, console: &mut dyn Console, input: &str) -> Step {
        match atoi(input) {
            1 => {
                console.println("Enter product name: ");
                Step::AddName
            }
            2 => {
                self.display(console);
                Step::Menu
            }
            3 => {
                console.println("Enter product name to update quantity: ");
                Step::QuantityName
            }
            4 => {
                console.println("Enter product name to update price: ");
                Step::PriceName
            }
            5 => {
                console.println("Enter product name to delete: ");
                Step::DeleteName
            }
            6 => {
                console.println("Exiting program. Freeing memory...");
                self.products.clear();
                console.println("All products freed. Session ended.");
                self.active = false;
                Step::Menu
            }
            _ => {
                console.println("Invalid choice. Please try again.");
                Step::Menu
            }
        }
    }

    fn add(&mut self, console: &mut dyn Console, draft: Draft, details: Details) {
        console.println(&format!("Product '{}' added successfully!", draft.name));
        self.products.insert(
            0,
            Product {
                name: draft.name,
                quantity: draft.quantity,
                price: draft.price,
                details,
            },
        );
    }

    fn find_then(
        &self,
        console: &mut dyn Console,
        name: &str,
        prompt: impl FnOnce(&Product) -> String,
    ) -> Option<String> {
        match self.products.iter().find(|p| p.name == name) {
            Some(product) => {
                console.print(&prompt(product));
                Some(name.to_string())
            }
            None => {
                console.println(&format!("Product '{name}' not found."));
                None
            }
        }
    }

    fn update(
        &mut self,
        console: &mut dyn Console,
        name: &str,
        apply: impl FnOnce(&mut Product) -> String,
    ) {
        match self.products.iter_mut().find(|p| p.name == name) {
            Some(product) => console.println(&apply(product)),
            None => console.println(&format!("Error: Product '{name}' lost during update.")),
        }
    }

    fn display(&self, console: &mut dyn Console) {
        if self.products.is_empty() {
            console.println("Cannot display any products. Inventory is empty.");
            return;
        }
        console.println("");
        console.println("--- Current Inventory ---");
        console.println("Name                Quantity    Price       Details");
        console.println(RULE);
        for p in &self.products {
            let details = match &p.details {
                Details::Dimensions(l, w, h) => format!("{l}x{w}x{h}"),
                Details::Description(d) => d.clone(),
            };
            console.println(&format!(
                "{:<20}{:<12}{:<10.2}{}",
                p.name, p.quantity, p.price, details
            ));
        }
        console.println(RULE);
    }
}

fn print_menu(console: &mut dyn Console) {
    console.println("");
    console.println("Inventory Management System");
    console.println("1. Add product");
    console.println("2. Display products");
    console.println("3. Update product quantity");
    console.println("4. Update product price");
    console.println("5. Delete product");
    console.println("6. Exit");
    console.println("Enter your choice:");
}

/// Optional starting stock from `inventory.json` next to the unit.
fn load_seed(console: &mut dyn Console) -> Vec<Product> {
    let Some(path) = console.locate(SEED_FILE) else {
        return Vec::new();
    };
    let Ok(data) = std::fs::read_to_string(&path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<SeedProduct>>(&data) {
        Ok(seed) => seed.into_iter().map(Product::from).collect(),
        Err(e) => {
            console.print_err(&format!("ignoring {SEED_FILE}: {e}\n"));
            Vec::new()
        }
    }
}

fn atoi(input: &str) -> i64 {
    input.trim().parse().unwrap_or(0)
}

fn atof(input: &str) -> f64 {
    input.trim().parse().unwrap_or(0.0)
}
