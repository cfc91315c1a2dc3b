/// One supported language: the user-facing key, the execution service's
/// language id and version index (a string on the wire), and the starter
/// template an empty buffer begins from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub key: &'static str,
    pub engine_id: &'static str,
    pub version_index: &'static str,
    pub template: &'static str,
}

const PYTHON_TEMPLATE: &str = "# Python 3 Template\n# Your code starts here";

const JAVA_TEMPLATE: &str = r"public class Main {
    public static void main(String[] args) {
        // Your code starts here
    }
}";

const C_TEMPLATE: &str = r"#include <stdio.h>

int main() {
    // Your code starts here
    return 0;
}";

const CPP_TEMPLATE: &str = r"#include <iostream>
using namespace std;

int main() {
    // Your code starts here
    return 0;
}";

const JAVASCRIPT_TEMPLATE: &str = "// JavaScript Template\n// Your code starts here";

const LANGUAGES: [Language; 5] = [
    Language {
        key: "Python 3",
        engine_id: "python3",
        version_index: "3",
        template: PYTHON_TEMPLATE,
    },
    Language {
        key: "Java",
        engine_id: "java",
        version_index: "4",
        template: JAVA_TEMPLATE,
    },
    Language {
        key: "C",
        engine_id: "c",
        version_index: "5",
        template: C_TEMPLATE,
    },
    Language {
        key: "C++",
        engine_id: "cpp17",
        version_index: "0",
        template: CPP_TEMPLATE,
    },
    Language {
        key: "JavaScript",
        engine_id: "nodejs",
        version_index: "4",
        template: JAVASCRIPT_TEMPLATE,
    },
];

pub fn resolve(key: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.key == key)
}

pub fn keys() -> Vec<&'static str> {
    LANGUAGES.iter().map(|lang| lang.key).collect()
}

pub fn template_for(key: &str) -> Option<&'static str> {
    resolve(key).map(|lang| lang.template)
}
