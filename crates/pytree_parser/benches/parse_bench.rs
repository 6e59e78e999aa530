use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pytree_parser::parse;

// A medium-size source (~60 lines) exercising the main constructs
const PYTHON_SOURCE: &str = r#"
class Shape:
    def __init__(self, name):
        self.name = name
        self.sides = 0

    def describe(self):
        return self.name

class Polygon(Shape):
    def __init__(self, name, sides):
        self.sides = sides

    def perimeter(self, lengths):
        total = 0
        for length in lengths:
            total += length
        return total

def classify(shapes):
    names = [s.describe() for s in shapes if s.sides > 2]
    return names

def area(width, height=1, *rest, **options):
    base = width * height
    if 'scale' in options:
        base = base * options['scale']
    return base

def fib(n):
    if n < 2:
        return n
    return fib(n - 1) + fib(n - 2)

values = [fib(i) for i in range(12)]
total = 0
for v in values:
    total += v

first, second = values[0], values[1]
middle = values[2:8]
table = {'total': total, 'first': first, 'second': second}

try:
    result = total // len(values)
except ZeroDivisionError:
    result = 0
finally:
    done = True

squares = map(lambda x: x ** 2, values)
label = "big" if total > 100 else "small"
print(label, result)
"#;

fn bench_parse_python(c: &mut Criterion) {
    c.bench_function("parse_python_medium", |b| {
        b.iter(|| {
            let program = parse(black_box(PYTHON_SOURCE)).expect("benchmark source parses");
            black_box(program);
        });
    });
}

criterion_group!(benches, bench_parse_python);
criterion_main!(benches);
