use rulecalc::{Calculator, EvalOptions};

fn main() {
    pretty_env_logger::init();

    let calculator = Calculator::with_defaults().expect("default grammar compiles");

    let expressions: Vec<String> = (1..=10)
        .map(|i| format!("pow({i}) + fdiv({i}, 3) * log(100)"))
        .chain(["add(1,)".to_string(), "3!!".to_string()])
        .collect();

    let results = calculator.evaluate_batch(&expressions, &EvalOptions::new());
    for (expression, result) in expressions.iter().zip(results) {
        match result {
            Ok(value) => println!("{} = {}", expression, value),
            Err(err) => println!("{}: {}", expression, err),
        }
    }
}
