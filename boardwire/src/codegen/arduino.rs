//! Arduino sketch templates
//!
//! Each supported component type contributes a [`Fragment`]: the `#define`
//! lines naming its bound pins, setup lines and a loop body. A single
//! component becomes a self-contained sketch. Several components are merged
//! into one sketch with per-component macro names.

use crate::analyzer::Issue;
use crate::catalog::{Board, Platform};
use crate::model::{Component, Netlist};

use super::{bind_pins, unsupported_component, Emitter};

pub const ARDUINO_HEADER: &str = "// Auto-generated code for Arduino\n\n";
pub const MULTI_HEADER: &str = "// Auto-generated code for multiple components\n\n";

/// Component pins the templates drive, by component type. Empty for types
/// without a template.
pub fn bound_pin_names(type_id: &str) -> &'static [&'static str] {
    match type_id {
        "led" => &["power"],
        "button" => &["signal"],
        "pot" => &["signal"],
        "servo" => &["signal"],
        "ultrasonic" => &["trigger", "echo"],
        "rgb_led" => &["red", "green", "blue"],
        _ => &[],
    }
}

pub fn has_template(type_id: &str) -> bool {
    !bound_pin_names(type_id).is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// The only component in the sketch
    Standalone,
    /// One of several; macro and variable names carry the component id
    Combined,
}

/// Source lines contributed by one component
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub includes: Vec<String>,
    pub defines: Vec<String>,
    pub globals: Vec<String>,
    pub setup: Vec<String>,
    pub loop_body: Vec<String>,
}

impl Fragment {
    fn include(mut self, line: &str) -> Self {
        self.includes.push(line.to_string());
        self
    }

    fn define(mut self, name: &str, pin: &str) -> Self {
        self.defines.push(format!("#define {} {}", name, pin));
        self
    }

    fn global(mut self, line: String) -> Self {
        self.globals.push(line);
        self
    }

    fn setup(mut self, line: impl Into<String>) -> Self {
        self.setup.push(format!("  {}", line.into()));
        self
    }

    fn body(mut self, line: impl Into<String>) -> Self {
        self.loop_body.push(format!("  {}", line.into()));
        self
    }

    fn body_if(self, cond: bool, line: impl Into<String>) -> Self {
        if cond {
            self.body(line)
        } else {
            self
        }
    }
}

/// Name for a macro or variable: bare when standalone, `{base}_{id}` when combined
fn name(base: &str, component: &Component, layout: Layout) -> String {
    match layout {
        Layout::Standalone => base.to_string(),
        Layout::Combined => format!("{}_{}", base, component.id),
    }
}

/// Lines for one component, given its bound board pins in
/// `bound_pin_names` order
fn fragment(component: &Component, pins: &[String], layout: Layout) -> Option<Fragment> {
    let standalone = layout == Layout::Standalone;
    let f = Fragment::default();

    let fragment = match (component.type_id.as_str(), pins) {
        ("led", [pin]) => {
            let led = name("LED_PIN", component, layout);
            let pause = if standalone { 1000 } else { 500 };
            f.define(&led, pin)
                .setup(format!("pinMode({}, OUTPUT);", led))
                .body(format!("digitalWrite({}, HIGH);", led))
                .body(format!("delay({});", pause))
                .body(format!("digitalWrite({}, LOW);", led))
                .body(format!("delay({});", pause))
        }
        ("button", [pin]) => {
            let button = name("BUTTON_PIN", component, layout);
            let message = if standalone {
                "Button pressed".to_string()
            } else {
                format!("{} pressed", component.id)
            };
            let mut f = f
                .define(&button, pin)
                .setup(format!("pinMode({}, INPUT_PULLUP);", button));
            if standalone {
                f = f.setup("Serial.begin(9600);");
            }
            f.body(format!("if (digitalRead({}) == LOW) {{", button))
                .body(format!("  Serial.println(\"{}\");", message))
                .body("}")
                .body_if(standalone, "delay(100);")
        }
        ("pot", [pin]) => {
            let pot = name("POT_PIN", component, layout);
            let value = name("potValue", component, layout);
            let mut f = f.define(&pot, pin);
            if standalone {
                f = f.setup("Serial.begin(9600);");
            }
            f.body(format!("int {} = analogRead({});", value, pot))
                .body_if(!standalone, format!("Serial.print(\"{}: \");", component.id))
                .body(format!("Serial.println({});", value))
                .body_if(standalone, "delay(100);")
        }
        ("servo", [pin]) => {
            let servo_pin = name("SERVO_PIN", component, layout);
            let servo = name("servo", component, layout);
            let f = f
                .include("#include <Servo.h>")
                .define(&servo_pin, pin)
                .global(format!("Servo {};", servo))
                .setup(format!("{}.attach({});", servo, servo_pin));
            if standalone {
                f.body("for (int angle = 0; angle <= 180; angle++) {")
                    .body(format!("  {}.write(angle);", servo))
                    .body("  delay(15);")
                    .body("}")
                    .body("for (int angle = 180; angle >= 0; angle--) {")
                    .body(format!("  {}.write(angle);", servo))
                    .body("  delay(15);")
                    .body("}")
            } else {
                f.body(format!("{}.write((millis() / 20) % 181);", servo))
            }
        }
        ("ultrasonic", [trigger, echo]) => {
            let trig = name("TRIG_PIN", component, layout);
            let echo_pin = name("ECHO_PIN", component, layout);
            let duration = name("duration", component, layout);
            let label = if standalone {
                "Distance: ".to_string()
            } else {
                format!("{} distance: ", component.id)
            };
            let mut f = f
                .define(&trig, trigger)
                .define(&echo_pin, echo)
                .setup(format!("pinMode({}, OUTPUT);", trig))
                .setup(format!("pinMode({}, INPUT);", echo_pin));
            if standalone {
                f = f.setup("Serial.begin(9600);");
            }
            f.body(format!("digitalWrite({}, LOW);", trig))
                .body("delayMicroseconds(2);")
                .body(format!("digitalWrite({}, HIGH);", trig))
                .body("delayMicroseconds(10);")
                .body(format!("digitalWrite({}, LOW);", trig))
                .body(format!("long {} = pulseIn({}, HIGH);", duration, echo_pin))
                .body(format!("Serial.print(\"{}\");", label))
                .body(format!("Serial.print({} * 0.034 / 2);", duration))
                .body("Serial.println(\" cm\");")
                .body_if(standalone, "delay(100);")
        }
        ("rgb_led", [red, green, blue]) => {
            let names = [
                name("RED_PIN", component, layout),
                name("GREEN_PIN", component, layout),
                name("BLUE_PIN", component, layout),
            ];
            let pause = if standalone { 1000 } else { 500 };
            let mut f = f
                .define(&names[0], red)
                .define(&names[1], green)
                .define(&names[2], blue);
            for n in &names {
                f = f.setup(format!("pinMode({}, OUTPUT);", n));
            }
            for lit in 0..names.len() {
                for (i, n) in names.iter().enumerate() {
                    let level = if i == lit { "HIGH" } else { "LOW" };
                    f = f.body(format!("digitalWrite({}, {});", n, level));
                }
                f = f.body(format!("delay({});", pause));
            }
            f
        }
        _ => return None,
    };
    Some(fragment)
}

fn push_block(out: &mut String, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
}

fn push_function(out: &mut String, signature: &str, lines: &[String]) {
    out.push_str(signature);
    out.push_str(" {\n");
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("}\n");
}

fn standalone_sketch(f: &Fragment) -> String {
    let mut out = String::from(ARDUINO_HEADER);
    push_block(&mut out, &f.includes);
    push_block(&mut out, &f.defines);
    push_block(&mut out, &f.globals);
    push_function(&mut out, "void setup()", &f.setup);
    out.push('\n');
    push_function(&mut out, "void loop()", &f.loop_body);
    out
}

fn combined_sketch(fragments: &[Fragment]) -> String {
    let mut includes: Vec<String> = Vec::new();
    let mut globals: Vec<String> = Vec::new();
    let mut defines = Vec::new();
    let mut setup = vec!["  Serial.begin(9600);".to_string()];
    let mut loop_body = Vec::new();

    for f in fragments {
        for line in &f.includes {
            if !includes.contains(line) {
                includes.push(line.clone());
            }
        }
        for line in &f.globals {
            if !globals.contains(line) {
                globals.push(line.clone());
            }
        }
        defines.extend(f.defines.iter().cloned());
        setup.extend(f.setup.iter().cloned());
        loop_body.extend(f.loop_body.iter().cloned());
    }
    loop_body.push("  delay(50);".to_string());

    let mut out = String::from(MULTI_HEADER);
    push_block(&mut out, &includes);
    push_block(&mut out, &defines);
    push_block(&mut out, &globals);
    push_function(&mut out, "void setup()", &setup);
    out.push('\n');
    push_function(&mut out, "void loop()", &loop_body);
    out
}

pub struct ArduinoEmitter;

impl Emitter for ArduinoEmitter {
    fn platform(&self) -> Platform {
        Platform::Arduino
    }

    fn emit(
        &self,
        _board: &Board,
        components: &[Component],
        netlist: &Netlist,
    ) -> (String, Vec<Issue>) {
        let mut issues = Vec::new();
        let layout = if components.len() == 1 {
            Layout::Standalone
        } else {
            Layout::Combined
        };

        let mut fragments = Vec::new();
        for component in components {
            if !has_template(&component.type_id) {
                issues.push(unsupported_component(component, self.platform()));
                continue;
            }
            let Some(pins) = bind_pins(
                component,
                bound_pin_names(&component.type_id),
                netlist,
                &mut issues,
            ) else {
                continue;
            };
            if let Some(f) = fragment(component, &pins, layout) {
                fragments.push(f);
            }
        }

        let source = match (layout, fragments.as_slice()) {
            (_, []) => ARDUINO_HEADER.to_string(),
            (Layout::Standalone, [only]) => standalone_sketch(only),
            _ => combined_sketch(&fragments),
        };
        (source, issues)
    }
}
