use crate::host::Console;
use crate::programs::{CallResult, Program};
use cshowcase::kernel::UnitValue;

const SUBJECT_COUNT: usize = 5;

#[derive(Debug, Clone)]
struct Student {
    id: i64,
    name: String,
    grades: [f64; SUBJECT_COUNT],
}

impl Student {
    fn average(&self) -> f64 {
        self.grades.iter().sum::<f64>() / SUBJECT_COUNT as f64
    }
}

#[derive(Debug, Default)]
enum Step {
    #[default]
    Menu,
    Id,
    Name(i64),
    Grade(Student, usize),
    Done,
}

#[derive(Debug, Default)]
pub struct Grades {
    students: Vec<Student>,
    step: Step,
}

impl Program for Grades {
    fn exports(&self) -> &'static [&'static str] {
        &["process_grades_input"]
    }

    fn has_main(&self) -> bool {
        true
    }

    fn call(&mut self, console: &mut dyn Console, name: &str, args: &[UnitValue]) -> CallResult {
        if name == "main" {
            self.students.clear();
            self.step = Step::Menu;
            menu(console);
            return Ok(Some(UnitValue::Number(0.0)));
        }
        self.input(console, crate::text_arg(args).trim());
        Ok(None)
    }
}

impl Grades {
    fn input(&mut self, console: &mut dyn Console, input: &str) {
        let step = std::mem::take(&mut self.step);
        self.step = match step {
            Step::Menu => match input.parse::<u32>().unwrap_or(0) {
                1 => {
                    console.println("");
                    console.println("Enter student details:");
                    console.print("ID: ");
                    Step::Id
                }
                2 => {
                    self.display(console);
                    menu(console);
                    Step::Menu
                }
                3 => {
                    self.statistics(console);
                    menu(console);
                    Step::Menu
                }
                4 => {
                    console.println("Exiting the program. Goodbye!");
                    Step::Done
                }
                _ => {
                    console.println("Invalid choice. Please try again.");
                    menu(console);
                    Step::Menu
                }
            },
            Step::Id => {
                console.print("Name: ");
                Step::Name(input.parse().unwrap_or(0))
            }
            Step::Name(id) => {
                let name = input.split_whitespace().next().unwrap_or("").to_string();
                console.print("Grade for subject 1: ");
                let student = Student {
                    id,
                    name,
                    grades: [0.0; SUBJECT_COUNT],
                };
                Step::Grade(student, 0)
            }
            Step::Grade(mut student, idx) => {
                student.grades[idx] = input.parse().unwrap_or(0.0);
                if idx + 1 < SUBJECT_COUNT {
                    console.print(&format!("Grade for subject {}: ", idx + 2));
                    Step::Grade(student, idx + 1)
                } else {
                    self.students.push(student);
                    console.println("Student data added successfully!");
                    menu(console);
                    Step::Menu
                }
            }
            Step::Done => {
                console.println("The program has exited. Start it again to continue.");
                Step::Done
            }
        };
    }

    fn display(&self, console: &mut dyn Console) {
        if self.students.is_empty() {
            console.println("No students to display.");
            return;
        }
        console.println("");
        console.println("=== Student Information ===");
        console.println(&format!(
            "{:<5} {:<20} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10}",
            "ID", "Name", "Grade1", "Grade2", "Grade3", "Grade4", "Grade5", "Average"
        ));
        for s in &self.students {
            let grades: Vec<String> = s.grades.iter().map(|g| format!("{g:<10.2}")).collect();
            console.println(&format!(
                "{:<5} {:<20} {} {:<10.2}",
                s.id,
                s.name,
                grades.join(" "),
                s.average()
            ));
        }
    }

    fn statistics(&self, console: &mut dyn Console) {
        let Some(first) = self.students.first() else {
            console.println("No students available to calculate statistics.");
            return;
        };

        let mut highest = first;
        let mut lowest = first;
        let mut total = 0.0;
        for s in &self.students {
            total += s.average();
            if s.average() > highest.average() {
                highest = s;
            }
            if s.average() < lowest.average() {
                lowest = s;
            }
        }

        console.println("");
        console.println(&format!(
            "Class Average: {:.2}",
            total / self.students.len() as f64
        ));
        console.println(&format!(
            "Highest Average: {:.2}, Student: {}",
            highest.average(),
            highest.name
        ));
        console.println(&format!(
            "Lowest Average: {:.2}, Student: {}",
            lowest.average(),
            lowest.name
        ));
    }
}

fn menu(console: &mut dyn Console) {
    console.println("");
    console.println("=== Dynamic Student Grade Management System ===");
    console.println("1. Add Student");
    console.println("2. Display All Students");
    console.println("3. Calculate Class Statistics");
    console.println("4. Exit");
    console.print("Enter your choice: ");
}
