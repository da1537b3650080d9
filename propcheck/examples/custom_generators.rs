//! Building generators for domain types out of the combinators.

use propcheck::{
    BoxedGenerator, Generator, ParallelConfig, RealDistribution, Runner, TestConfig, elements,
    fallible, frequency, from_fn, int_range, list, one_of, property, property_with, real,
    recursive, sized, string,
};
use rand::Rng;

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct Order {
    customer: String,
    quantity: u32,
    unit_price: f64,
    priority: &'static str,
}

#[derive(Debug, Clone)]
enum Expr {
    Num(i64),
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn depth(&self) -> usize {
        match self {
            Expr::Num(_) => 0,
            Expr::Add(left, right) | Expr::Mul(left, right) => {
                1 + left.depth().max(right.depth())
            }
        }
    }
}

fn orders() -> BoxedGenerator<Order> {
    let priority = frequency(vec![
        (8, elements(vec!["normal"]).boxed()),
        (2, elements(vec!["rush", "overnight"]).boxed()),
    ]);
    let price = real(0.5, 500.0, RealDistribution::Exponential { rate: 0.05 });

    string(1, 16)
        .zip(int_range(1u32, 100))
        .zip(price.zip(priority))
        .map(|((customer, quantity), (unit_price, priority))| Order {
            customer,
            quantity,
            unit_price,
            priority,
        })
        .boxed()
}

fn expressions() -> BoxedGenerator<Expr> {
    let leaf = int_range(-10i64, 10).map(Expr::Num);
    recursive(leaf.clone(), 3, move |inner| {
        let pairs = inner.clone().zip(inner);
        one_of(vec![
            leaf.clone().boxed(),
            pairs
                .clone()
                .map(|(left, right)| Expr::Add(Box::new(left), Box::new(right)))
                .boxed(),
            pairs
                .map(|(left, right)| Expr::Mul(Box::new(left), Box::new(right)))
                .boxed(),
        ])
        .boxed()
    })
    .boxed()
}

fn main() {
    let runner = Runner::new(TestConfig::default().with_iterations(500));

    let totals = property_with(
        "order totals are bounded",
        orders(),
        fallible(|order: &Order| {
            let total = order.quantity as f64 * order.unit_price;
            if total <= 50_000.0 {
                Ok(())
            } else {
                Err(format!("total {total:.2} exceeds limit"))
            }
        }),
    );
    if let Ok(result) = runner.check(&totals) {
        println!("{result}");
    }

    let depth = property("expressions are shallow", expressions(), |expr: &Expr| {
        expr.depth() <= 3
    });
    if let Ok(result) = runner.check(&depth) {
        println!("{result}");
    }

    // Lengths that follow the size hint
    let scaled = sized(|size| list(int_range(0u8, 255), 0, size));
    let bounded = property("scaled lists", scaled, |values: &Vec<u8>| values.len() <= 10);
    if let Ok(result) = runner.check(&bounded) {
        println!("{result}");
    }

    let dice = from_fn(|rng, _config| Ok(rng.gen_range(1u32..=6) + rng.gen_range(1u32..=6)));
    let sevens = property("never seven", dice, |sum: &u32| *sum != 7);
    if let Ok(report) = runner.tally(&sevens, &ParallelConfig::default()) {
        println!(
            "{}: {} of {} rolls hit seven ({:.1}%)",
            report.property_name,
            report.num_failed,
            report.num_tests,
            report.failure_rate() * 100.0
        );
    }
}
