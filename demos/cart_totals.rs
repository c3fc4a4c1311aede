//! Demonstration of a derived store summarising a shopping cart

use tincan_derived::{derive, Merge, Store};

#[derive(Clone, Debug)]
struct CartItem {
    name: String,
    price_cents: u64,
    quantity: u32,
}

#[derive(Clone, Debug)]
struct Checkout {
    coupon_percent: u64,
    shipping_cents: u64,
}

#[derive(Default)]
struct CheckoutPatch {
    coupon_percent: Option<u64>,
    shipping_cents: Option<u64>,
}

impl Merge<CheckoutPatch> for Checkout {
    fn merge(&mut self, patch: CheckoutPatch) {
        if let Some(coupon_percent) = patch.coupon_percent {
            self.coupon_percent = coupon_percent;
        }
        if let Some(shipping_cents) = patch.shipping_cents {
            self.shipping_cents = shipping_cents;
        }
    }
}

fn cents(amount: u64) -> String {
    format!("${}.{:02}", amount / 100, amount % 100)
}

fn main() {
    println!("=== Derived Store Example: Cart Totals ===\n");

    let cart = Store::new(Vec::<CartItem>::new());
    let checkout = Store::new(Checkout {
        coupon_percent: 0,
        shipping_cents: 499,
    });

    // The total is never written directly, only recomputed
    let total = derive(
        (cart.clone(), checkout.clone()),
        |deps: &(Vec<CartItem>, Checkout), _, _| {
            let (items, checkout) = deps;
            let subtotal: u64 = items
                .iter()
                .map(|item| item.price_cents * u64::from(item.quantity))
                .sum();
            let discount = subtotal * checkout.coupon_percent / 100;
            subtotal - discount + checkout.shipping_cents
        },
    );

    println!("1. Initial total: {}", cents(total.get_state()));

    println!("\n2. Setting up subscriber");
    let _ = total.subscribe(|state, prev| {
        println!("   [Total Update] {} -> {}", cents(*prev), cents(*state));
    });

    println!("\n3. Adding items");
    cart.update(|items| {
        items.push(CartItem {
            name: "Tin can".to_string(),
            price_cents: 250,
            quantity: 4,
        });
    });
    cart.update(|items| {
        items.push(CartItem {
            name: "String".to_string(),
            price_cents: 120,
            quantity: 1,
        });
    });

    println!("\n4. Applying a coupon");
    checkout.set_state(CheckoutPatch {
        coupon_percent: Some(10),
        ..Default::default()
    });

    println!("\n5. Free shipping");
    checkout.set_state(CheckoutPatch {
        shipping_cents: Some(0),
        ..Default::default()
    });

    println!("\n6. Trying to write the total");
    if let Err(err) = total.set_state(0u64) {
        println!("   Rejected: {}", err);
    }

    println!("\n7. Items in cart:");
    cart.read(|items| {
        for item in items {
            println!("   {} x{} @ {}", item.name, item.quantity, cents(item.price_cents));
        }
    });

    println!("\n8. Disposing the total");
    total.dispose();
    cart.update(|items| items.clear());
    println!("   Frozen total: {}", cents(total.get_state()));

    println!("\n✓ Example complete!");
}
